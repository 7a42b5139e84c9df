// ==========================================
// 员工导入系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (scope_id + key → value)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use crate::importer::data_cleaner::DEFAULT_DATE_FORMATS;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}

fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "si" | "sí" => true,
        "false" | "0" | "no" => false,
        _ => default,
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_update_existing(&self) -> Result<bool, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::UPDATE_EXISTING, "true")?;
        Ok(parse_flag(&value, true))
    }

    async fn get_date_formats(&self) -> Result<Vec<String>, Box<dyn Error>> {
        let defaults = || -> Vec<String> {
            DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect()
        };

        let value = match self.get_config_value(config_keys::DATE_FORMATS)? {
            Some(v) => v,
            None => return Ok(defaults()),
        };

        // JSON 数组，例如 ["%d/%m/%Y", "%Y-%m-%d"]
        let formats: Vec<String> = serde_json::from_str(&value).unwrap_or_else(|_| {
            tracing::warn!(
                config_key = config_keys::DATE_FORMATS,
                raw_value = %value,
                "date format config is not a JSON array, using defaults"
            );
            Vec::new()
        });

        let formats: Vec<String> = formats
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();

        if formats.is_empty() {
            Ok(defaults())
        } else {
            Ok(formats)
        }
    }

    async fn get_report_unmapped_columns(&self) -> Result<bool, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::REPORT_UNMAPPED_COLUMNS, "true")?;
        Ok(parse_flag(&value, true))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const UPDATE_EXISTING: &str = "import.update_existing";
    pub const DATE_FORMATS: &str = "import.date_formats"; // JSON 数组
    pub const REPORT_UNMAPPED_COLUMNS: &str = "import.report_unmapped_columns";
}
