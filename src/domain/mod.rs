// ==========================================
// 员工导入系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、枚举、导入报告
// 红线: 不含数据访问逻辑,不含导入规则
// ==========================================

pub mod employee;
pub mod import;
pub mod types;

// 重导出核心类型
pub use employee::{CandidateRecord, Department, Employee};
pub use import::{ImportResult, ImportedEmployee, RowOutcome};
pub use types::{fold_accents, EducationLevel, EmployeeStatus};
