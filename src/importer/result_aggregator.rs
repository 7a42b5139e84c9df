// ==========================================
// 员工导入系统 - 导入结果汇总器
// ==========================================
// 职责: 累计计数 / 行错误 / 警告 / 受影响员工，生成最终 ImportResult
// 成功判定: 无失败行，或至少一行新建/更新；结构错误与系统错误一律失败
// ==========================================

use crate::domain::{ImportResult, ImportedEmployee, RowOutcome};
use crate::importer::error::{ImportError, RowError};
use crate::importer::reconciliation::Reconciled;
use std::collections::HashMap;

pub struct ResultAggregator {
    result: ImportResult,
    aborted: bool,
}

impl ResultAggregator {
    pub fn new(import_id: String, file_name: Option<String>) -> Self {
        Self {
            result: ImportResult::new(import_id, file_name),
            aborted: false,
        }
    }

    pub fn set_total_rows(&mut self, total_rows: usize) {
        self.result.total_rows = total_rows;
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.result.warnings.push(warning.into());
    }

    pub fn add_warnings(&mut self, warnings: impl IntoIterator<Item = String>) {
        self.result.warnings.extend(warnings);
    }

    /// 结构错误：作为唯一的错误条目
    pub fn record_structural_failure(&mut self, err: &ImportError) {
        self.result.errors.clear();
        self.result.errors.push(err.to_string());
        self.aborted = true;
    }

    /// 系统错误（提交失败等）：已有计数保留，批次判定为失败
    pub fn record_system_error(&mut self, message: impl Into<String>) {
        self.result
            .errors
            .push(ImportError::System(message.into()).to_string());
        self.aborted = true;
    }

    pub fn record_row_failure(&mut self, row: usize, reason: RowError) {
        self.result.failed_imports += 1;
        self.result
            .errors
            .push(ImportError::Row { row, reason }.to_string());
    }

    /// 记录一行成功（新建或更新）
    pub fn record_success(&mut self, row: usize, reconciled: Reconciled, department_name: &str) {
        let Reconciled { outcome, employee } = reconciled;
        let is_update = outcome == RowOutcome::Updated;
        if is_update {
            self.result.updated_records += 1;
        } else {
            self.result.successful_imports += 1;
        }

        self.result.summaries.push(ImportedEmployee {
            row_number: row,
            id: employee.id,
            full_name: employee.full_name(),
            email: employee.email.clone(),
            position: employee.position.clone(),
            department: department_name.to_string(),
            status: employee.status.label().to_string(),
            is_update,
        });
        self.result.imported_employees.push(employee);
    }

    /// 提交后回填存储层分配的 id（键为小写邮箱）
    pub fn assign_ids(&mut self, ids: &HashMap<String, i64>) {
        for employee in &mut self.result.imported_employees {
            if employee.id.is_none() {
                employee.id = ids.get(&employee.natural_key()).copied();
            }
        }
        for summary in &mut self.result.summaries {
            if summary.id.is_none() {
                summary.id = ids.get(&summary.email.to_lowercase()).copied();
            }
        }
    }

    pub fn current(&self) -> &ImportResult {
        &self.result
    }

    /// 生成最终结果
    pub fn finish(mut self, elapsed_ms: u64) -> ImportResult {
        let r = &self.result;
        let success = !self.aborted
            && (r.failed_imports == 0 || r.successful_imports > 0 || r.updated_records > 0);
        self.result.success = success;
        self.result.elapsed_ms = elapsed_ms;
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EducationLevel, Employee, EmployeeStatus};
    use crate::importer::error::StructuralError;
    use chrono::NaiveDate;

    fn reconciled(email: &str, outcome: RowOutcome, id: Option<i64>) -> Reconciled {
        Reconciled {
            outcome,
            employee: Employee {
                id,
                document_number: None,
                first_name: "Ana".to_string(),
                last_name: "Pérez".to_string(),
                email: email.to_string(),
                phone: "3001234567".to_string(),
                address: "Calle 1".to_string(),
                birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
                hire_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                position: "Analista".to_string(),
                salary: 3_000_000.0,
                status: EmployeeStatus::Active,
                education_level: EducationLevel::Professional,
                department_id: 6,
                professional_profile: None,
            },
        }
    }

    fn aggregator() -> ResultAggregator {
        ResultAggregator::new("import-1".to_string(), Some("empleados.xlsx".to_string()))
    }

    #[test]
    fn test_all_rows_failed_is_failure() {
        let mut agg = aggregator();
        agg.set_total_rows(3);
        for row in 2..=4 {
            agg.record_row_failure(row, RowError::InvalidSalary);
        }
        let result = agg.finish(5);

        assert!(!result.success);
        assert_eq!(result.failed_imports, 3);
        assert_eq!(result.errors[0], "row 2: salary must be a valid number");
        assert_eq!(result.elapsed_ms, 5);
    }

    #[test]
    fn test_partial_failure_is_success() {
        let mut agg = aggregator();
        agg.record_success(2, reconciled("ana@x.com", RowOutcome::Inserted, None), "Tecnología");
        agg.record_row_failure(3, RowError::DepartmentNotFound("Marketing2".to_string()));
        agg.record_row_failure(4, RowError::InvalidSalary);
        let result = agg.finish(0);

        assert!(result.success);
        assert_eq!(result.successful_imports, 1);
        assert_eq!(result.failed_imports, 2);
        assert_eq!(result.imported_employees.len(), 1);
        assert_eq!(result.summaries[0].department, "Tecnología");
        assert_eq!(result.summaries[0].status, "Activo");
        assert!(!result.summaries[0].is_update);
    }

    #[test]
    fn test_update_counts_separately() {
        let mut agg = aggregator();
        agg.record_success(2, reconciled("ana@x.com", RowOutcome::Updated, Some(9)), "Ventas");
        let result = agg.finish(0);

        assert_eq!(result.updated_records, 1);
        assert_eq!(result.successful_imports, 0);
        assert!(result.summaries[0].is_update);
        assert_eq!(result.summaries[0].id, Some(9));
    }

    #[test]
    fn test_structural_failure_is_sole_error() {
        let mut agg = aggregator();
        agg.add_warning("detected 3 columns in the file");
        agg.record_structural_failure(&ImportError::from(StructuralError::MissingColumns(vec![
            "Email".to_string(),
        ])));
        let result = agg.finish(0);

        assert!(!result.success);
        assert_eq!(result.errors, vec!["missing required columns: Email".to_string()]);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.total_rows, 0);
    }

    #[test]
    fn test_system_error_keeps_counters() {
        let mut agg = aggregator();
        agg.record_success(2, reconciled("ana@x.com", RowOutcome::Inserted, None), "Ventas");
        agg.record_system_error("disk full");
        let result = agg.finish(0);

        assert!(!result.success);
        assert_eq!(result.successful_imports, 1);
        assert_eq!(result.errors, vec!["system error: disk full".to_string()]);
    }

    #[test]
    fn test_assign_ids_after_commit() {
        let mut agg = aggregator();
        agg.record_success(2, reconciled("Ana@x.com", RowOutcome::Inserted, None), "Ventas");
        let ids = HashMap::from([("ana@x.com".to_string(), 42)]);
        agg.assign_ids(&ids);
        let result = agg.finish(0);

        assert_eq!(result.imported_employees[0].id, Some(42));
        assert_eq!(result.summaries[0].id, Some(42));
    }
}
