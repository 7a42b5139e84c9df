// ==========================================
// 员工导入系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 表头归一 / 日期 / 金额 / 邮箱格式
// ==========================================

use crate::domain::types::fold_accents;
use crate::importer::employee_importer_trait::DataCleaner as DataCleanerTrait;
use crate::importer::file_parser::CellValue;
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

/// 电子表格日期序列号纪元（OLE Automation: 1899-12-30 为 0）
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// 序列号上限（9999-12-31）
const MAX_DATE_SERIAL: f64 = 2_958_465.0;

/// 默认的本地日期字符串格式（按顺序尝试）
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y/%m/%d",
    "%Y%m%d",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// 货币符号与千分位分隔符
const SALARY_STRIP_CHARS: &[char] = &['$', '€', '£', ',', ' ', '\u{a0}'];

/// 序列号 → 日期（小数部分为时间，忽略）
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..MAX_DATE_SERIAL + 1.0).contains(&serial) {
        return None;
    }
    let (y, m, d) = SERIAL_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d)?.checked_add_days(Days::new(serial.floor() as u64))
}

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
        )
        .expect("email regex is valid")
    })
}

pub struct DataCleaner {
    date_formats: Vec<String>,
}

impl DataCleaner {
    pub fn new(date_formats: Vec<String>) -> Self {
        Self { date_formats }
    }

    fn parse_date_text(&self, value: &str) -> Option<NaiveDate> {
        for format in &self.date_formats {
            if let Ok(date) = NaiveDate::parse_from_str(value, format) {
                return Some(date);
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
                return Some(dt.date());
            }
        }
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.date_naive())
            .ok()
    }
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect())
    }
}

impl DataCleanerTrait for DataCleaner {
    fn normalize_header(&self, value: &str) -> String {
        fold_accents(value.trim())
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }

    fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn parse_date(&self, cell: &CellValue) -> Option<NaiveDate> {
        match cell {
            // 1. 原生日期
            CellValue::Date(date) => Some(*date),
            // 2. 序列号
            CellValue::Number(serial) => excel_serial_to_date(*serial),
            // 3. 本地日期字符串（纯数字文本先按序列号尝试）
            CellValue::Text(text) => {
                let text = text.trim();
                text.parse::<f64>()
                    .ok()
                    .and_then(excel_serial_to_date)
                    .or_else(|| self.parse_date_text(text))
            }
            CellValue::Empty | CellValue::Bool(_) => None,
        }
    }

    fn parse_salary(&self, cell: &CellValue) -> Option<f64> {
        let value = match cell {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(text) => {
                let cleaned: String = text
                    .chars()
                    .filter(|c| !SALARY_STRIP_CHARS.contains(c))
                    .collect();
                cleaned.parse::<f64>().ok()
            }
            _ => None,
        };
        value.filter(|v| v.is_finite())
    }

    fn is_valid_email(&self, value: &str) -> bool {
        email_regex().is_match(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> CellValue {
        CellValue::Text(value.to_string())
    }

    #[test]
    fn test_normalize_header() {
        let cleaner = DataCleaner::default();
        assert_eq!(
            cleaner.normalize_header("  Fecha de Nacimiento "),
            "fechadenacimiento"
        );
        assert_eq!(cleaner.normalize_header("Teléfono"), "telefono");
        assert_eq!(cleaner.normalize_header("DIRECCIÓN"), "direccion");
    }

    #[test]
    fn test_normalize_null() {
        let cleaner = DataCleaner::default();
        assert_eq!(cleaner.normalize_null(Some("  ".to_string())), None);
        assert_eq!(cleaner.normalize_null(None), None);
        assert_eq!(
            cleaner.normalize_null(Some("  value  ".to_string())),
            Some("value".to_string())
        );
    }

    #[test]
    fn test_parse_date_order() {
        let cleaner = DataCleaner::default();
        let expected = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();

        assert_eq!(cleaner.parse_date(&CellValue::Date(expected)), Some(expected));
        assert_eq!(cleaner.parse_date(&CellValue::Number(32874.0)), Some(expected));
        assert_eq!(cleaner.parse_date(&CellValue::Number(32874.75)), Some(expected));
        assert_eq!(cleaner.parse_date(&text("32874")), Some(expected));
        assert_eq!(cleaner.parse_date(&text("1990-01-01")), Some(expected));
        assert_eq!(cleaner.parse_date(&text("01/01/1990")), Some(expected));
        assert_eq!(cleaner.parse_date(&text("19900101")), Some(expected));
        assert_eq!(
            cleaner.parse_date(&text("1990-01-01T08:30:00Z")),
            Some(expected)
        );
    }

    #[test]
    fn test_parse_date_invalid() {
        let cleaner = DataCleaner::default();
        assert_eq!(cleaner.parse_date(&text("no es fecha")), None);
        assert_eq!(cleaner.parse_date(&CellValue::Number(-5.0)), None);
        assert_eq!(cleaner.parse_date(&CellValue::Empty), None);
    }

    #[test]
    fn test_parse_date_custom_formats() {
        let cleaner = DataCleaner::new(vec!["%m/%d/%Y".to_string()]);
        assert_eq!(
            cleaner.parse_date(&text("12/31/2020")),
            NaiveDate::from_ymd_opt(2020, 12, 31)
        );
        assert_eq!(cleaner.parse_date(&text("2020-12-31")), None);
    }

    #[test]
    fn test_parse_salary() {
        let cleaner = DataCleaner::default();
        assert_eq!(cleaner.parse_salary(&text("3000000")), Some(3_000_000.0));
        assert_eq!(cleaner.parse_salary(&text("$3,000,000.50")), Some(3_000_000.5));
        assert_eq!(cleaner.parse_salary(&text(" € 1 200 ")), Some(1200.0));
        assert_eq!(cleaner.parse_salary(&CellValue::Number(2500.0)), Some(2500.0));
        assert_eq!(cleaner.parse_salary(&text("tres millones")), None);
        assert_eq!(cleaner.parse_salary(&text("NaN")), None);
        assert_eq!(cleaner.parse_salary(&text("$")), None);
        assert_eq!(cleaner.parse_salary(&CellValue::Empty), None);
    }

    #[test]
    fn test_is_valid_email() {
        let cleaner = DataCleaner::default();
        assert!(cleaner.is_valid_email("ana@x.com"));
        assert!(cleaner.is_valid_email("ana.perez+rrhh@empresa.com.co"));
        assert!(!cleaner.is_valid_email("ana@"));
        assert!(!cleaner.is_valid_email("ana x@x.com"));
        assert!(!cleaner.is_valid_email("ana..perez@x.com"));
        assert!(!cleaner.is_valid_email("@x.com"));
        assert!(!cleaner.is_valid_email("ana@-x.com"));
    }

    #[test]
    fn test_excel_serial_range() {
        assert_eq!(excel_serial_to_date(0.0), None);
        assert_eq!(excel_serial_to_date(20_200_101.0), None);
        assert_eq!(
            excel_serial_to_date(1.0),
            NaiveDate::from_ymd_opt(1899, 12, 31)
        );
    }
}
