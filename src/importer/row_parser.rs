// ==========================================
// 员工导入系统 - 行解析与校验
// ==========================================
// 职责: 数据行 → CandidateRecord 或行错误原因
// 规则: 固定顺序校验，第一个失败即返回，不再检查后续字段
// 红线: 无副作用（不读写存储，部门表只读）
// ==========================================

use crate::domain::{fold_accents, CandidateRecord, Department, EducationLevel, EmployeeStatus};
use crate::importer::employee_importer_trait::DataCleaner;
use crate::importer::error::RowError;
use crate::importer::file_parser::CellValue;
use crate::importer::header_mapper::{CanonicalField, ColumnMapping};
use chrono::NaiveDate;
use std::collections::HashMap;

static EMPTY_CELL: CellValue = CellValue::Empty;

// ==========================================
// DepartmentTable - 部门名称索引（每次导入构建一次）
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct DepartmentTable {
    by_name: HashMap<String, Department>,
}

impl DepartmentTable {
    pub fn new(departments: Vec<Department>) -> Self {
        let by_name = departments
            .into_iter()
            .map(|d| (d.name.trim().to_lowercase(), d))
            .collect();
        Self { by_name }
    }

    /// 按名称查找（大小写不敏感）
    pub fn resolve(&self, name: &str) -> Option<&Department> {
        self.by_name.get(&name.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

// ==========================================
// RowParser - 行解析器
// ==========================================
pub struct RowParser {
    cleaner: Box<dyn DataCleaner>,
}

/// 单行的读取视图
struct RowView<'a> {
    cells: &'a [CellValue],
    mapping: &'a ColumnMapping,
}

impl<'a> RowView<'a> {
    fn cell(&self, field: CanonicalField) -> &'a CellValue {
        self.mapping
            .get(field)
            .and_then(|col| col.checked_sub(1))
            .and_then(|index| self.cells.get(index))
            .unwrap_or(&EMPTY_CELL)
    }
}

impl RowParser {
    pub fn new(cleaner: Box<dyn DataCleaner>) -> Self {
        Self { cleaner }
    }

    /// 解析并校验一行数据
    ///
    /// # 参数
    /// - row_number: 表格行号（1 基，仅用于 CandidateRecord）
    /// - cells: 当前行单元格
    /// - mapping: 已通过结构校验的列映射
    /// - departments: 部门索引
    ///
    /// # 返回
    /// - Ok(CandidateRecord): 全部字段通过
    /// - Err(RowError): 第一个失败的规则
    pub fn parse_row(
        &self,
        row_number: usize,
        cells: &[CellValue],
        mapping: &ColumnMapping,
        departments: &DepartmentTable,
    ) -> Result<CandidateRecord, RowError> {
        let row = RowView { cells, mapping };

        // 1. 必填文本
        let require = |field: CanonicalField| {
            self.text(&row, field)
                .ok_or_else(|| RowError::Required(field.label().to_string()))
        };
        let first_name = require(CanonicalField::FirstName)?;
        let last_name = require(CanonicalField::LastName)?;
        let email = require(CanonicalField::Email)?;
        let phone = require(CanonicalField::Phone)?;
        let address = require(CanonicalField::Address)?;
        let position = require(CanonicalField::Position)?;

        // 2. 邮箱格式
        if !self.cleaner.is_valid_email(&email) {
            return Err(RowError::InvalidEmail(email));
        }

        // 3. 日期
        let birth_date = self.date(&row, CanonicalField::BirthDate)?;
        let hire_date = self.date(&row, CanonicalField::HireDate)?;

        // 4. 薪资
        let salary = self
            .cleaner
            .parse_salary(row.cell(CanonicalField::Salary))
            .ok_or(RowError::InvalidSalary)?;

        // 5. 状态
        let status_raw = self.text(&row, CanonicalField::Status).unwrap_or_default();
        let status = EmployeeStatus::from_synonym(&fold_accents(&status_raw))
            .ok_or(RowError::InvalidStatus(status_raw))?;

        // 6. 学历
        let education_raw = self
            .text(&row, CanonicalField::EducationLevel)
            .unwrap_or_default();
        let education_level = EducationLevel::from_synonym(&fold_accents(&education_raw))
            .ok_or(RowError::InvalidEducationLevel(education_raw))?;

        // 7. 部门
        let department_name = self
            .text(&row, CanonicalField::Department)
            .ok_or_else(|| RowError::Required(CanonicalField::Department.label().to_string()))?;
        let department = departments
            .resolve(&department_name)
            .cloned()
            .ok_or(RowError::DepartmentNotFound(department_name))?;

        // 8. 可选字段（列未映射或为空均不报错）
        let professional_profile = self.text(&row, CanonicalField::ProfessionalProfile);
        let document_number = self.text(&row, CanonicalField::DocumentNumber);

        Ok(CandidateRecord {
            row_number,
            document_number,
            first_name,
            last_name,
            email,
            phone,
            address,
            birth_date,
            hire_date,
            position,
            salary,
            status,
            education_level,
            department,
            professional_profile,
        })
    }

    fn text(&self, row: &RowView<'_>, field: CanonicalField) -> Option<String> {
        self.cleaner.normalize_null(row.cell(field).as_text())
    }

    fn date(&self, row: &RowView<'_>, field: CanonicalField) -> Result<NaiveDate, RowError> {
        let cell = row.cell(field);
        if cell.is_blank() {
            return Err(RowError::Required(field.label().to_string()));
        }
        self.cleaner
            .parse_date(cell)
            .ok_or_else(|| RowError::InvalidDate(field.label().to_string()))
    }
}
