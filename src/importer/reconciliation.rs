// ==========================================
// 员工导入系统 - 对账引擎（新建 / 更新 判定）
// ==========================================
// 自然键: email（大小写不敏感）
// 快照: 导入开始时读取一次，整批只在内存工作集上对账
// 同批重复邮箱: 首次出现 → 新建；后续出现 → 更新该新建记录（后写覆盖）
// ==========================================

use crate::domain::{CandidateRecord, Employee, RowOutcome};
use crate::importer::error::RowError;
use std::collections::HashMap;

/// 单行对账结果
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub outcome: RowOutcome,
    pub employee: Employee, // 应用本行后的记录
}

/// 待提交到存储的变更
#[derive(Debug, Clone, PartialEq)]
pub enum StagedChange {
    Add(Employee),
    Update(Employee),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Stored,  // 快照中已有
    Pending, // 本批新建
}

#[derive(Debug)]
struct WorkingEntry {
    employee: Employee,
    origin: Origin,
    touched: bool,
}

// ==========================================
// ReconciliationEngine - 对账引擎
// ==========================================
pub struct ReconciliationEngine {
    entries: Vec<WorkingEntry>,
    by_key: HashMap<String, usize>,
    touched: Vec<usize>, // 首次变更顺序
    update_existing: bool,
}

impl ReconciliationEngine {
    /// 以存储快照构建工作集
    ///
    /// # 参数
    /// - snapshot: 导入开始时的全部员工
    /// - update_existing: false 时邮箱已存在的行记为失败
    pub fn new(snapshot: Vec<Employee>, update_existing: bool) -> Self {
        let mut engine = Self {
            entries: Vec::with_capacity(snapshot.len()),
            by_key: HashMap::with_capacity(snapshot.len()),
            touched: Vec::new(),
            update_existing,
        };
        for employee in snapshot {
            // 存储中若有大小写重复的邮箱，以先出现者为准
            let key = employee.natural_key();
            if engine.by_key.contains_key(&key) {
                continue;
            }
            engine.by_key.insert(key, engine.entries.len());
            engine.entries.push(WorkingEntry {
                employee,
                origin: Origin::Stored,
                touched: false,
            });
        }
        engine
    }

    /// 对一条候选记录做新建/更新判定，并更新工作集
    pub fn reconcile(&mut self, candidate: CandidateRecord) -> Result<Reconciled, RowError> {
        let key = candidate.natural_key();

        match self.by_key.get(&key).copied() {
            Some(idx) => {
                if !self.update_existing {
                    return Err(RowError::DuplicateEmail(candidate.email));
                }
                let entry = &mut self.entries[idx];
                apply_mutable_fields(&mut entry.employee, candidate);
                let employee = entry.employee.clone();
                self.mark_touched(idx);
                Ok(Reconciled {
                    outcome: RowOutcome::Updated,
                    employee,
                })
            }
            None => {
                let employee = candidate.into_new_employee();
                let idx = self.entries.len();
                self.entries.push(WorkingEntry {
                    employee: employee.clone(),
                    origin: Origin::Pending,
                    touched: false,
                });
                self.by_key.insert(key, idx);
                self.mark_touched(idx);
                Ok(Reconciled {
                    outcome: RowOutcome::Inserted,
                    employee,
                })
            }
        }
    }

    /// 本批需要写入存储的变更（按首次变更顺序，每条记录只出现一次）
    pub fn staged_changes(&self) -> Vec<StagedChange> {
        self.touched
            .iter()
            .map(|idx| {
                let entry = &self.entries[*idx];
                match entry.origin {
                    Origin::Pending => StagedChange::Add(entry.employee.clone()),
                    Origin::Stored => StagedChange::Update(entry.employee.clone()),
                }
            })
            .collect()
    }

    fn mark_touched(&mut self, idx: usize) {
        let entry = &mut self.entries[idx];
        if !entry.touched {
            entry.touched = true;
            self.touched.push(idx);
        }
    }
}

/// 把候选记录的可变字段写到已有记录上（保留 id / email / 证件号）
fn apply_mutable_fields(target: &mut Employee, candidate: CandidateRecord) {
    target.first_name = candidate.first_name;
    target.last_name = candidate.last_name;
    target.phone = candidate.phone;
    target.address = candidate.address;
    target.birth_date = candidate.birth_date;
    target.hire_date = candidate.hire_date;
    target.position = candidate.position;
    target.salary = candidate.salary;
    target.status = candidate.status;
    target.education_level = candidate.education_level;
    target.department_id = candidate.department.id;
    target.professional_profile = candidate.professional_profile;
}
