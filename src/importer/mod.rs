// ==========================================
// 员工导入系统 - 导入层
// ==========================================
// 职责: 电子表格 → 员工主数据（新建/更新）+ 导入报告
// 支持: Excel (.xlsx/.xls), CSV
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod employee_importer_impl;
pub mod employee_importer_trait;
pub mod error;
pub mod file_parser;
pub mod header_mapper;
pub mod reconciliation;
pub mod result_aggregator;
pub mod row_parser;

// 重导出核心类型
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use employee_importer_impl::EmployeeImporterImpl;
pub use error::{ImportError, ImporterResult, RowError, StructuralError};
pub use file_parser::{
    CellValue, CsvParser, ExcelParser, SpreadsheetFormat, UniversalFileParser, Workbook, Worksheet,
};
pub use header_mapper::{CanonicalField, ColumnMapping, HeaderMapper, HeaderMapping};
pub use reconciliation::{Reconciled, ReconciliationEngine, StagedChange};
pub use result_aggregator::ResultAggregator;
pub use row_parser::{DepartmentTable, RowParser};

// 重导出 Trait 接口
pub use employee_importer_trait::{DataCleaner, EmployeeImporter, FileParser, ReadSeek};
