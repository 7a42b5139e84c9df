// ==========================================
// 员工导入系统 - 导入结果模型
// ==========================================
// 职责: 一次导入调用的完整报告（不落库）
// ==========================================

use crate::domain::employee::Employee;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ImportResult - 导入结果
// ==========================================
// 生命周期: 每次导入调用创建一次，由导入器逐行累加，返回调用方
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResult {
    // ===== 批次元信息 =====
    pub import_id: String,
    pub file_name: Option<String>,
    pub imported_at: DateTime<Utc>,
    pub elapsed_ms: u64,

    // ===== 计数 =====
    pub total_rows: usize,         // 数据行数（不含表头、不含全空行）
    pub successful_imports: usize, // 新建
    pub updated_records: usize,    // 更新
    pub failed_imports: usize,     // 失败行

    // ===== 明细（按发生顺序）=====
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub imported_employees: Vec<Employee>,
    pub summaries: Vec<ImportedEmployee>,

    pub success: bool,
}

impl ImportResult {
    pub fn new(import_id: String, file_name: Option<String>) -> Self {
        Self {
            import_id,
            file_name,
            imported_at: Utc::now(),
            elapsed_ms: 0,
            total_rows: 0,
            successful_imports: 0,
            updated_records: 0,
            failed_imports: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            imported_employees: Vec::new(),
            summaries: Vec::new(),
            success: false,
        }
    }
}

// ==========================================
// ImportedEmployee - 受影响员工摘要
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedEmployee {
    pub row_number: usize,
    pub id: Option<i64>,
    pub full_name: String,
    pub email: String,
    pub position: String,
    pub department: String,
    pub status: String,
    pub is_update: bool,
}

// ==========================================
// RowOutcome - 单行对账结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowOutcome {
    Inserted,
    Updated,
}
