// ==========================================
// 员工导入系统 - 领域枚举类型
// ==========================================
// 职责: 员工状态 / 学历层次 + 同义词表（唯一事实来源）
// 红线: 表格中的同义词只在此处维护，导入层不得另写 match 分支
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// EmployeeStatus - 员工状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeStatus {
    Active,   // 在职
    Inactive, // 离职
    Vacation, // 休假
}

/// 状态同义词表（匹配前统一做 小写 + 去重音）
const STATUS_SYNONYMS: &[(EmployeeStatus, &[&str])] = &[
    (EmployeeStatus::Active, &["activo", "active"]),
    (EmployeeStatus::Inactive, &["inactivo", "inactive"]),
    (EmployeeStatus::Vacation, &["vacaciones", "vacation"]),
];

impl EmployeeStatus {
    /// 按同义词表解析状态
    ///
    /// # 参数
    /// - normalized: 已经过 小写 + 去重音 处理的文本
    pub fn from_synonym(normalized: &str) -> Option<Self> {
        lookup_synonym(STATUS_SYNONYMS, normalized)
    }

    /// 数据库存储值
    pub fn as_db_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "ACTIVE",
            EmployeeStatus::Inactive => "INACTIVE",
            EmployeeStatus::Vacation => "VACATION",
        }
    }

    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "ACTIVE" => Some(EmployeeStatus::Active),
            "INACTIVE" => Some(EmployeeStatus::Inactive),
            "VACATION" => Some(EmployeeStatus::Vacation),
            _ => None,
        }
    }

    /// 面向业务人员的展示名
    pub fn label(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "Activo",
            EmployeeStatus::Inactive => "Inactivo",
            EmployeeStatus::Vacation => "Vacaciones",
        }
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

// ==========================================
// EducationLevel - 学历层次
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EducationLevel {
    Professional,   // 本科（Profesional）
    Technical,      // 技工（Técnico）
    Technologist,   // 技师（Tecnólogo）
    Master,         // 硕士（Maestría）
    Specialization, // 专业进修（Especialización）
}

/// 学历同义词表
///
/// 重音/无重音两种拼写都显式列出；匹配前输入同样做去重音，
/// 因此表外的大小写/重音变体也会落到同一层次。
const EDUCATION_SYNONYMS: &[(EducationLevel, &[&str])] = &[
    (EducationLevel::Professional, &["profesional", "professional"]),
    (EducationLevel::Technical, &["técnico", "tecnico", "technical"]),
    (
        EducationLevel::Technologist,
        &["tecnólogo", "tecnologo", "technologist"],
    ),
    (EducationLevel::Master, &["maestría", "maestria", "master"]),
    (
        EducationLevel::Specialization,
        &["especialización", "especializacion", "specialization"],
    ),
];

impl EducationLevel {
    pub fn from_synonym(normalized: &str) -> Option<Self> {
        lookup_synonym(EDUCATION_SYNONYMS, normalized)
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            EducationLevel::Professional => "PROFESSIONAL",
            EducationLevel::Technical => "TECHNICAL",
            EducationLevel::Technologist => "TECHNOLOGIST",
            EducationLevel::Master => "MASTER",
            EducationLevel::Specialization => "SPECIALIZATION",
        }
    }

    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "PROFESSIONAL" => Some(EducationLevel::Professional),
            "TECHNICAL" => Some(EducationLevel::Technical),
            "TECHNOLOGIST" => Some(EducationLevel::Technologist),
            "MASTER" => Some(EducationLevel::Master),
            "SPECIALIZATION" => Some(EducationLevel::Specialization),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EducationLevel::Professional => "Profesional",
            EducationLevel::Technical => "Técnico",
            EducationLevel::Technologist => "Tecnólogo",
            EducationLevel::Master => "Maestría",
            EducationLevel::Specialization => "Especialización",
        }
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

// ==========================================
// 同义词查找
// ==========================================

/// 小写 + 去掉固定的西语重音字符集
///
/// 表头识别与枚举同义词匹配共用这一套规则。
pub fn fold_accents(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

fn lookup_synonym<T: Copy>(table: &[(T, &[&str])], normalized: &str) -> Option<T> {
    table
        .iter()
        .find(|(_, synonyms)| synonyms.iter().any(|s| fold_accents(s) == normalized))
        .map(|(value, _)| *value)
}
