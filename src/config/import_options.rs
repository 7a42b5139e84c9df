// ==========================================
// 员工导入系统 - 导入选项
// ==========================================
// 职责: 单次导入使用的配置快照（导入开始时读取一次）
// ==========================================

use crate::importer::data_cleaner::DEFAULT_DATE_FORMATS;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// 邮箱已存在时更新（false: 记为行错误）
    pub update_existing: bool,

    /// 日期字符串格式（chrono 格式串，按顺序尝试）
    pub date_formats: Vec<String>,

    /// 未识别表头是否写入警告
    pub report_unmapped_columns: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            update_existing: true,
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            report_unmapped_columns: true,
        }
    }
}
