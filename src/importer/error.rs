// ==========================================
// 员工导入系统 - 导入模块错误类型
// ==========================================
// 分类: 结构错误（整批中止）/ 行错误（跳过该行）/ 系统错误
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (only .xlsx/.xls/.csv)")]
    UnsupportedFormat(String),

    #[error("failed to read file: {0}")]
    FileReadError(String),

    #[error("failed to parse Excel file: {0}")]
    ExcelParseError(String),

    #[error("failed to parse CSV file: {0}")]
    CsvParseError(String),

    // ===== 结构错误 =====
    #[error(transparent)]
    Structural(#[from] StructuralError),

    // ===== 行错误 =====
    #[error("row {row}: {reason}")]
    Row { row: usize, reason: RowError },

    // ===== 系统错误 =====
    #[error("system error: {0}")]
    System(String),
}

/// 结构错误：任何一行被处理之前整批中止
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StructuralError {
    #[error("the file does not contain any worksheet")]
    NoWorksheet,

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("the file does not contain employee data rows")]
    NoDataRows,
}

/// 行错误：只排除当前行，批次继续
///
/// Display 文本即写入 ImportResult.errors 的原因部分。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("field '{0}' is required")]
    Required(String),

    #[error("invalid email: {0}")]
    InvalidEmail(String),

    #[error("field '{0}' has no valid date format")]
    InvalidDate(String),

    #[error("salary must be a valid number")]
    InvalidSalary,

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid education level: {0}")]
    InvalidEducationLevel(String),

    #[error("department not found: {0}")]
    DepartmentNotFound(String),

    #[error("email already exists: {0}")]
    DuplicateEmail(String),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImporterResult<T> = Result<T, ImportError>;
