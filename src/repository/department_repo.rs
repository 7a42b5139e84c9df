// ==========================================
// 员工导入系统 - 部门仓储 Trait
// ==========================================

use crate::domain::Department;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// 实现者: DepartmentRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    /// 全部部门
    async fn list(&self) -> RepositoryResult<Vec<Department>>;

    /// 按名称查找（大小写不敏感）
    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Department>>;
}
