// ==========================================
// 员工导入系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::import_options::ImportOptions;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）/ ImportOptions（固定值）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 邮箱已存在时是否更新
    ///
    /// # 默认值
    /// - true
    async fn get_update_existing(&self) -> Result<bool, Box<dyn Error>>;

    /// 日期字符串格式列表
    ///
    /// # 默认值
    /// - DEFAULT_DATE_FORMATS
    async fn get_date_formats(&self) -> Result<Vec<String>, Box<dyn Error>>;

    /// 是否为未识别表头生成警告
    ///
    /// # 默认值
    /// - true
    async fn get_report_unmapped_columns(&self) -> Result<bool, Box<dyn Error>>;

    /// 读取完整的导入选项
    async fn load_import_options(&self) -> Result<ImportOptions, Box<dyn Error>> {
        let update_existing = self.get_update_existing().await?;
        let date_formats = self.get_date_formats().await?;
        let report_unmapped_columns = self.get_report_unmapped_columns().await?;

        Ok(ImportOptions {
            update_existing,
            date_formats,
            report_unmapped_columns,
        })
    }
}

// 固定选项（不依赖数据库）
#[async_trait]
impl ImportConfigReader for ImportOptions {
    async fn get_update_existing(&self) -> Result<bool, Box<dyn Error>> {
        Ok(self.update_existing)
    }

    async fn get_date_formats(&self) -> Result<Vec<String>, Box<dyn Error>> {
        Ok(self.date_formats.clone())
    }

    async fn get_report_unmapped_columns(&self) -> Result<bool, Box<dyn Error>> {
        Ok(self.report_unmapped_columns)
    }
}
