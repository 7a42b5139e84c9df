// ==========================================
// 员工导入系统 - 员工仓储 Trait
// ==========================================
// 职责: 定义员工主数据访问接口（不包含业务逻辑）
// 语义: add / update 只登记待写变更，commit 一次性落库
// ==========================================

use crate::domain::Employee;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// EmployeeRepository Trait
// ==========================================
// 用途: 导入器的记录存储
// 实现者: EmployeeRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// 全部员工（不含未提交的变更）
    async fn list(&self) -> RepositoryResult<Vec<Employee>>;

    /// 登记新建（id 由 commit 分配）
    async fn add(&self, employee: Employee) -> RepositoryResult<()>;

    /// 登记更新（employee.id 必须存在）
    async fn update(&self, employee: Employee) -> RepositoryResult<()>;

    /// 提交全部待写变更
    ///
    /// # 返回
    /// - Ok(usize): 写入的记录数
    /// - Err: 数据库错误（整个事务回滚，待写变更丢弃）
    async fn commit(&self) -> RepositoryResult<usize>;
}
