// ==========================================
// 员工导入系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 员工电子表格批量导入（表头识别 / 行校验 / 邮箱对账）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 导入选项
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{EducationLevel, EmployeeStatus};

// 领域实体
pub use domain::{CandidateRecord, Department, Employee, ImportResult, ImportedEmployee};

// 导入器
pub use importer::{EmployeeImporter, EmployeeImporterImpl, ImportError, SpreadsheetFormat};

// 仓储
pub use repository::{
    DepartmentRepository, DepartmentRepositoryImpl, EmployeeRepository, EmployeeRepositoryImpl,
};

// 配置
pub use config::{ConfigManager, ImportConfigReader, ImportOptions};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "talento-import";
