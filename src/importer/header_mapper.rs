// ==========================================
// 员工导入系统 - 表头映射器实现
// ==========================================
// 职责: 第 1 行表头 → 标准字段列号映射（列顺序/拼写不固定）
// 规则: 有序规则表 (标准字段, 同义词, 排除词)，按优先级第一个命中者胜出
// ==========================================

use crate::importer::data_cleaner::DataCleaner as DefaultCleaner;
use crate::importer::employee_importer_trait::DataCleaner;
use crate::importer::file_parser::CellValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// CanonicalField - 标准字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalField {
    DocumentNumber,
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    BirthDate,
    HireDate,
    Position,
    Salary,
    Status,
    EducationLevel,
    Department,
    ProfessionalProfile,
}

impl CanonicalField {
    /// 必填字段（缺失列时的报告顺序）
    pub const MANDATORY: [CanonicalField; 12] = [
        CanonicalField::FirstName,
        CanonicalField::LastName,
        CanonicalField::Email,
        CanonicalField::Phone,
        CanonicalField::Address,
        CanonicalField::BirthDate,
        CanonicalField::HireDate,
        CanonicalField::Position,
        CanonicalField::Salary,
        CanonicalField::Status,
        CanonicalField::EducationLevel,
        CanonicalField::Department,
    ];

    pub fn is_mandatory(&self) -> bool {
        Self::MANDATORY.contains(self)
    }

    /// 标准表头名称（用于错误信息）
    pub fn label(&self) -> &'static str {
        match self {
            CanonicalField::DocumentNumber => "Documento",
            CanonicalField::FirstName => "Nombres",
            CanonicalField::LastName => "Apellidos",
            CanonicalField::Email => "Email",
            CanonicalField::Phone => "Teléfono",
            CanonicalField::Address => "Dirección",
            CanonicalField::BirthDate => "Fecha de Nacimiento",
            CanonicalField::HireDate => "Fecha de Ingreso",
            CanonicalField::Position => "Cargo",
            CanonicalField::Salary => "Salario",
            CanonicalField::Status => "Estado",
            CanonicalField::EducationLevel => "Nivel Educativo",
            CanonicalField::Department => "Departamento",
            CanonicalField::ProfessionalProfile => "Perfil Profesional",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 表头识别规则表（顺序即优先级）
const HEADER_RULES: &[(CanonicalField, &[&str], &[&str])] = &[
    (
        CanonicalField::DocumentNumber,
        &["documento", "document", "identificacion", "cedula", "dni"],
        &["apellido"],
    ),
    (
        CanonicalField::FirstName,
        &["nombres", "nombre", "first name", "firstname"],
        &[],
    ),
    (
        CanonicalField::LastName,
        &["apellidos", "apellido", "last name", "lastname"],
        &[],
    ),
    (
        CanonicalField::Email,
        &["email", "correo", "correo electronico", "e-mail", "mail"],
        &[],
    ),
    (
        CanonicalField::Phone,
        &["telefono", "teléfono", "phone", "celular", "movil"],
        &[],
    ),
    (
        CanonicalField::Address,
        &["direccion", "dirección", "address", "domicilio"],
        &[],
    ),
    (
        CanonicalField::BirthDate,
        &["fechanacimiento", "fechadenacimiento", "fechanac", "nacimiento", "birthdate"],
        &[],
    ),
    (
        CanonicalField::HireDate,
        &["fechaingreso", "fechadeingreso", "ingreso", "hiredate"],
        &[],
    ),
    (
        CanonicalField::Position,
        &["cargo", "position", "puesto", "rol", "posicion"],
        &[],
    ),
    (
        CanonicalField::Salary,
        &["salario", "salary", "sueldo", "remuneracion", "pago"],
        &[],
    ),
    (
        CanonicalField::Status,
        &["estado", "status", "state", "estatus"],
        &[],
    ),
    (
        CanonicalField::EducationLevel,
        &["niveleducativo", "educacion", "education", "nivel"],
        &[],
    ),
    (
        CanonicalField::Department,
        &["departamento", "department", "area", "área", "seccion"],
        &[],
    ),
    (
        CanonicalField::ProfessionalProfile,
        &["perfilprofesional", "perfil", "profile", "descripcion"],
        &[],
    ),
];

// ==========================================
// ColumnMapping - 标准字段 → 列号（1 基）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    columns: BTreeMap<CanonicalField, usize>,
}

impl ColumnMapping {
    pub fn get(&self, field: CanonicalField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    /// 设置列号；字段已映射时保留首次出现的列并返回 false
    pub fn assign(&mut self, field: CanonicalField, column: usize) -> bool {
        if self.columns.contains_key(&field) {
            return false;
        }
        self.columns.insert(field, column);
        true
    }

    /// 全部必填字段均已映射
    pub fn is_valid(&self) -> bool {
        CanonicalField::MANDATORY
            .iter()
            .all(|f| self.columns.contains_key(f))
    }

    /// 缺失的必填字段（固定枚举顺序）
    pub fn missing_fields(&self) -> Vec<CanonicalField> {
        CanonicalField::MANDATORY
            .iter()
            .filter(|f| !self.columns.contains_key(f))
            .copied()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, usize)> + '_ {
        self.columns.iter().map(|(f, c)| (*f, *c))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ==========================================
// HeaderMapping - 表头扫描结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct HeaderMapping {
    pub mapping: ColumnMapping,
    pub header_count: usize, // 非空表头数
    pub warnings: Vec<String>,
}

struct HeaderRule {
    field: CanonicalField,
    synonyms: Vec<String>,
    exclusions: Vec<String>,
}

impl HeaderRule {
    fn matches(&self, normalized_header: &str) -> bool {
        self.synonyms.iter().any(|s| normalized_header.contains(s.as_str()))
            && !self
                .exclusions
                .iter()
                .any(|e| normalized_header.contains(e.as_str()))
    }
}

// ==========================================
// HeaderMapper - 表头映射器
// ==========================================
pub struct HeaderMapper {
    rules: Vec<HeaderRule>,
    cleaner: Box<dyn DataCleaner>,
    report_unmapped: bool,
}

impl HeaderMapper {
    pub fn new(cleaner: Box<dyn DataCleaner>, report_unmapped: bool) -> Self {
        // 同义词与表头走同一套归一化
        let rules = HEADER_RULES
            .iter()
            .map(|(field, synonyms, exclusions)| HeaderRule {
                field: *field,
                synonyms: synonyms.iter().map(|s| cleaner.normalize_header(s)).collect(),
                exclusions: exclusions
                    .iter()
                    .map(|s| cleaner.normalize_header(s))
                    .collect(),
            })
            .collect();

        Self {
            rules,
            cleaner,
            report_unmapped,
        }
    }

    /// 识别单个表头
    pub fn match_header(&self, header: &str) -> Option<CanonicalField> {
        let normalized = self.cleaner.normalize_header(header);
        if normalized.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map(|rule| rule.field)
    }

    /// 扫描表头行，生成列映射
    pub fn map_headers(&self, header_row: &[CellValue]) -> HeaderMapping {
        let mut result = HeaderMapping::default();

        for (idx, cell) in header_row.iter().enumerate() {
            let column = idx + 1;
            let header = match self.cleaner.normalize_null(cell.as_text()) {
                Some(h) => h,
                None => continue,
            };
            result.header_count += 1;

            match self.match_header(&header) {
                Some(field) => {
                    if !result.mapping.assign(field, column) {
                        result.warnings.push(format!(
                            "column {} '{}' duplicates field '{}' and will be ignored",
                            column, header, field
                        ));
                    }
                }
                None if self.report_unmapped => {
                    result.warnings.push(format!(
                        "column {} '{}' was not recognized and will be ignored",
                        column, header
                    ));
                }
                None => {}
            }
        }

        result
    }
}

impl Default for HeaderMapper {
    fn default() -> Self {
        Self::new(Box::new(DefaultCleaner::default()), true)
    }
}
