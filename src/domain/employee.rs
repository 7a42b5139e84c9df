// ==========================================
// 员工导入系统 - 员工领域模型
// ==========================================
// 职责: 员工实体 / 部门实体 / 单行解析结果（CandidateRecord）
// 红线: 不含数据访问逻辑，不含导入规则
// ==========================================

use crate::domain::types::{EducationLevel, EmployeeStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Department - 部门
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
}

// ==========================================
// Employee - 员工主数据
// ==========================================
// 自然键: email（大小写不敏感）
// 主键: id（由存储层分配，新建记录提交前为 None）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    // ===== 主键 =====
    pub id: Option<i64>,

    // ===== 身份信息 =====
    pub document_number: Option<String>, // 证件号（可选列）
    pub first_name: String,
    pub last_name: String,
    pub email: String,

    // ===== 联系方式 =====
    pub phone: String,
    pub address: String,

    // ===== 日期 =====
    pub birth_date: NaiveDate,
    pub hire_date: NaiveDate,

    // ===== 岗位信息 =====
    pub position: String,
    pub salary: f64,
    pub status: EmployeeStatus,
    pub education_level: EducationLevel,
    pub department_id: i64,

    // ===== 可选 =====
    pub professional_profile: Option<String>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// 自然键（小写邮箱）
    pub fn natural_key(&self) -> String {
        self.email.to_lowercase()
    }
}

// ==========================================
// CandidateRecord - 单行解析结果
// ==========================================
// 生命周期: 每行构造一次，立即交给对账步骤消费
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub row_number: usize,

    pub document_number: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub birth_date: NaiveDate,
    pub hire_date: NaiveDate,
    pub position: String,
    pub salary: f64,
    pub status: EmployeeStatus,
    pub education_level: EducationLevel,
    pub department: Department,
    pub professional_profile: Option<String>,
}

impl CandidateRecord {
    /// 以候选记录构造新员工（id 待存储层分配）
    pub fn into_new_employee(self) -> Employee {
        Employee {
            id: None,
            document_number: self.document_number,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            birth_date: self.birth_date,
            hire_date: self.hire_date,
            position: self.position,
            salary: self.salary,
            status: self.status,
            education_level: self.education_level,
            department_id: self.department.id,
            professional_profile: self.professional_profile,
        }
    }

    pub fn natural_key(&self) -> String {
        self.email.to_lowercase()
    }
}
