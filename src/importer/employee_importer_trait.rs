// ==========================================
// 员工导入系统 - 员工导入 Trait
// ==========================================
// 导入管道: 解析 → 表头映射 → 行校验 → 对账 → 汇总 → 提交
// 职责: 定义导入接口（不包含实现）
// ==========================================

use crate::domain::import::ImportResult;
use crate::importer::error::ImporterResult;
use crate::importer::file_parser::{CellValue, SpreadsheetFormat, Workbook};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::io::{Read, Seek};
use std::path::Path;

/// 可回绕的输入流
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

// ==========================================
// EmployeeImporter Trait
// ==========================================
// 用途: 员工导入主接口
// 实现者: EmployeeImporterImpl
#[async_trait]
pub trait EmployeeImporter: Send + Sync {
    /// 结构校验（不处理任何数据行）
    ///
    /// # 检查项
    /// 1. 至少一个工作表
    /// 2. 第 1 行表头覆盖全部必填字段
    /// 3. 表头下至少一行数据
    ///
    /// # 返回
    /// - ImportResult: success=false 时 errors 中只有一条结构错误
    async fn validate_structure<R: Read + Seek + Send>(
        &self,
        reader: &mut R,
        format: SpreadsheetFormat,
    ) -> ImportResult;

    /// 从输入流导入员工数据
    ///
    /// # 参数
    /// - reader: 输入流（解析前回绕到起点；由调用方释放）
    /// - format: 输入格式
    /// - file_name: 原始文件名（仅用于报告）
    ///
    /// # 返回
    /// - ImportResult: 行级失败不阻断批次，全部计入报告
    async fn import_employees<R: Read + Seek + Send>(
        &self,
        reader: &mut R,
        format: SpreadsheetFormat,
        file_name: Option<String>,
    ) -> ImportResult;

    /// 从文件导入（按扩展名选择格式）
    async fn import_from_file<P: AsRef<Path> + Send>(&self, file_path: P) -> ImportResult;

    /// 从已解析的工作簿导入
    ///
    /// 其余入口解析完成后都汇入这里；结构校验在处理任何一行之前执行。
    async fn import_workbook(&self, workbook: &Workbook, file_name: Option<String>) -> ImportResult;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: ExcelParser / CsvParser
pub trait FileParser: Send + Sync {
    /// 从当前位置读取整个工作簿
    ///
    /// # 返回
    /// - Ok(Workbook): 与格式无关的单元格网格
    /// - Err: 文件格式错误
    fn parse_workbook(&self, reader: &mut dyn ReadSeek) -> ImporterResult<Workbook>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 单元格清洗与类型转换接口
// 实现者: DataCleanerImpl
pub trait DataCleaner: Send + Sync {
    /// 表头归一化（小写 + 去空格 + 去重音）
    fn normalize_header(&self, value: &str) -> String;

    /// 标准化 NULL 值（空字符串/空白 → None，其余 TRIM）
    fn normalize_null(&self, value: Option<String>) -> Option<String>;

    /// 解析日期
    ///
    /// # 顺序
    /// 1. 原生日期单元格
    /// 2. 数值序列号（纪元 1899-12-30）
    /// 3. 本地日期字符串
    fn parse_date(&self, cell: &CellValue) -> Option<NaiveDate>;

    /// 解析金额（去货币符号与千分位）
    fn parse_salary(&self, cell: &CellValue) -> Option<f64>;

    /// 邮箱地址格式校验
    fn is_valid_email(&self, value: &str) -> bool;
}
