// ==========================================
// 员工导入系统 - 员工仓储实现
// ==========================================
// 职责: 实现员工数据访问（使用 rusqlite）
// 提交: 待写变更在单个事务中落库（原子）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{EducationLevel, Employee, EmployeeStatus};
use crate::repository::employee_repo::EmployeeRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex};

const SELECT_EMPLOYEE: &str = r#"
    SELECT employee_id, document_number, first_name, last_name, email,
           phone, address, birth_date, hire_date, position, salary,
           status, education_level, department_id, professional_profile
    FROM employee
"#;

#[derive(Debug, Clone)]
enum PendingWrite {
    Insert(Employee),
    Update(Employee),
}

// ==========================================
// EmployeeRepositoryImpl
// ==========================================
pub struct EmployeeRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
    pending: Mutex<Vec<PendingWrite>>,
}

impl EmployeeRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            pending: Mutex::new(Vec::new()),
        }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn stage(&self, write: PendingWrite) -> RepositoryResult<()> {
        self.pending
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?
            .push(write);
        Ok(())
    }

    /// 未提交的变更数
    pub fn pending_count(&self) -> RepositoryResult<usize> {
        Ok(self
            .pending
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?
            .len())
    }

    /// 按邮箱查询（大小写不敏感）
    pub fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Employee>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE email = ?1 COLLATE NOCASE", SELECT_EMPLOYEE);
        let employee = conn
            .query_row(&sql, params![email], map_employee_row)
            .optional()?;
        Ok(employee)
    }

    fn insert_tx(tx: &Transaction, employee: &Employee) -> RepositoryResult<()> {
        tx.execute(
            r#"
            INSERT INTO employee (
                document_number, first_name, last_name, email, phone, address,
                birth_date, hire_date, position, salary, status, education_level,
                department_id, professional_profile
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                employee.document_number,
                employee.first_name,
                employee.last_name,
                employee.email,
                employee.phone,
                employee.address,
                employee.birth_date,
                employee.hire_date,
                employee.position,
                employee.salary,
                employee.status.as_db_str(),
                employee.education_level.as_db_str(),
                employee.department_id,
                employee.professional_profile,
            ],
        )?;
        Ok(())
    }

    fn update_tx(tx: &Transaction, employee: &Employee) -> RepositoryResult<()> {
        let id = employee.id.ok_or_else(|| {
            RepositoryError::ValidationError(format!("employee {} has no id", employee.email))
        })?;

        let affected = tx.execute(
            r#"
            UPDATE employee SET
                document_number = ?2, first_name = ?3, last_name = ?4, phone = ?5,
                address = ?6, birth_date = ?7, hire_date = ?8, position = ?9,
                salary = ?10, status = ?11, education_level = ?12,
                department_id = ?13, professional_profile = ?14
            WHERE employee_id = ?1
            "#,
            params![
                id,
                employee.document_number,
                employee.first_name,
                employee.last_name,
                employee.phone,
                employee.address,
                employee.birth_date,
                employee.hire_date,
                employee.position,
                employee.salary,
                employee.status.as_db_str(),
                employee.education_level.as_db_str(),
                employee.department_id,
                employee.professional_profile,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "employee".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

fn map_employee_row(row: &Row) -> rusqlite::Result<Employee> {
    let status: String = row.get(11)?;
    let education: String = row.get(12)?;

    Ok(Employee {
        id: Some(row.get(0)?),
        document_number: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        email: row.get(4)?,
        phone: row.get(5)?,
        address: row.get(6)?,
        birth_date: row.get(7)?,
        hire_date: row.get(8)?,
        position: row.get(9)?,
        salary: row.get(10)?,
        status: EmployeeStatus::from_db_str(&status)
            .ok_or_else(|| conversion_error(11, format!("unknown status {}", status)))?,
        education_level: EducationLevel::from_db_str(&education)
            .ok_or_else(|| conversion_error(12, format!("unknown education level {}", education)))?,
        department_id: row.get(13)?,
        professional_profile: row.get(14)?,
    })
}

#[async_trait]
impl EmployeeRepository for EmployeeRepositoryImpl {
    async fn list(&self) -> RepositoryResult<Vec<Employee>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY employee_id", SELECT_EMPLOYEE);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_employee_row)?;

        let mut employees = Vec::new();
        for row in rows {
            employees.push(row?);
        }
        Ok(employees)
    }

    async fn add(&self, employee: Employee) -> RepositoryResult<()> {
        self.stage(PendingWrite::Insert(employee))
    }

    async fn update(&self, employee: Employee) -> RepositoryResult<()> {
        if employee.id.is_none() {
            return Err(RepositoryError::ValidationError(format!(
                "employee {} has no id",
                employee.email
            )));
        }
        self.stage(PendingWrite::Update(employee))
    }

    async fn commit(&self) -> RepositoryResult<usize> {
        let writes = {
            let mut pending = self
                .pending
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            std::mem::take(&mut *pending)
        };
        if writes.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        for write in &writes {
            match write {
                PendingWrite::Insert(employee) => Self::insert_tx(&tx, employee)?,
                PendingWrite::Update(employee) => Self::update_tx(&tx, employee)?,
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tracing::debug!(count = writes.len(), "employee changes committed");
        Ok(writes.len())
    }
}
