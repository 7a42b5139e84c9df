// ==========================================
// 员工导入系统 - 部门仓储实现
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::Department;
use crate::repository::department_repo::DepartmentRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct DepartmentRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl DepartmentRepositoryImpl {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新建部门，返回自增 id
    pub fn insert(&self, name: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute("INSERT INTO department (name) VALUES (?1)", params![name])?;
        Ok(conn.last_insert_rowid())
    }

    /// 以指定 id 新建部门（初始化基础数据用）
    pub fn insert_with_id(&self, id: i64, name: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO department (department_id, name) VALUES (?1, ?2)",
            params![id, name],
        )?;
        Ok(())
    }
}

#[async_trait]
impl DepartmentRepository for DepartmentRepositoryImpl {
    async fn list(&self) -> RepositoryResult<Vec<Department>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT department_id, name FROM department ORDER BY department_id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Department {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        let mut departments = Vec::new();
        for row in rows {
            departments.push(row?);
        }
        Ok(departments)
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Department>> {
        // SQLite NOCASE 只处理 ASCII，这里按 Unicode 小写比较
        let wanted = name.trim().to_lowercase();
        let departments = self.list().await?;
        Ok(departments
            .into_iter()
            .find(|d| d.name.to_lowercase() == wanted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn repo() -> (NamedTempFile, DepartmentRepositoryImpl) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        let conn = open_sqlite_connection(db_path).unwrap();
        crate::db::init_schema(&conn).unwrap();
        (
            temp_file,
            DepartmentRepositoryImpl::from_connection(Arc::new(Mutex::new(conn))),
        )
    }

    #[tokio::test]
    async fn test_insert_and_find_case_insensitive() {
        let (_tmp, repo) = repo();
        repo.insert_with_id(6, "Tecnología").unwrap();
        let id = repo.insert("Ventas").unwrap();
        assert_eq!(id, 7);

        let found = repo.find_by_name("TECNOLOGÍA").await.unwrap().unwrap();
        assert_eq!(found.id, 6);
        assert!(repo.find_by_name("Marketing2").await.unwrap().is_none());
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }
}
