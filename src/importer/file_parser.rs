// ==========================================
// 员工导入系统 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析 → 与格式无关的单元格网格
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// ==========================================

use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::employee_importer_trait::{FileParser, ReadSeek};
use calamine::{Data, Range, Reader, Xls, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

// ==========================================
// CellValue - 单元格值
// ==========================================
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate), // 原生日期单元格
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 单元格的文本表示（未 trim；空单元格为 None）
    ///
    /// 整数值的浮点数不带小数部分输出，避免电话号码等被写成 "3001234567.0"。
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(format!("{}", n))
                }
            }
            CellValue::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
            CellValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }

    fn from_excel(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(n) => CellValue::Number(*n),
            Data::Int(n) => CellValue::Number(*n as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => {
                // 1900 日期系统；is_1904 标记 calamine 未公开
                match crate::importer::data_cleaner::excel_serial_to_date(dt.as_f64()) {
                    Some(date) => CellValue::Date(date),
                    None => CellValue::Number(dt.as_f64()),
                }
            }
            Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .map(|dt| dt.date())
                .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
                .map(CellValue::Date)
                .unwrap_or_else(|_| CellValue::Text(s.clone())),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
        }
    }
}

// ==========================================
// Worksheet - 工作表网格（行列均为 1 基）
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    pub name: String,
    rows: Vec<Vec<CellValue>>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// 第 1 行（表头）
    pub fn header_row(&self) -> &[CellValue] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// 读取单元格；越界返回空单元格
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        if row == 0 || col == 0 {
            return &EMPTY_CELL;
        }
        self.rows
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .unwrap_or(&EMPTY_CELL)
    }

    /// 表格最大列数
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// 数据行（第 2 行起，跳过完全空白的行）
    ///
    /// # 返回
    /// - (行号, 单元格切片)，行号为表格中的 1 基行号
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[CellValue])> {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, cells)| !cells.iter().all(CellValue::is_blank))
            .map(|(idx, cells)| (idx + 1, cells.as_slice()))
    }

    pub fn data_row_count(&self) -> usize {
        self.data_rows().count()
    }
}

// ==========================================
// Workbook - 解析后的工作簿
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn first_sheet(&self) -> Option<&Worksheet> {
        self.sheets.first()
    }
}

// ==========================================
// SpreadsheetFormat - 输入格式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpreadsheetFormat {
    Xlsx,
    Xls,
    Csv,
}

impl SpreadsheetFormat {
    /// 根据扩展名判断格式
    pub fn from_path(path: &Path) -> ImporterResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "xlsx" | "xlsm" => Ok(SpreadsheetFormat::Xlsx),
            "xls" => Ok(SpreadsheetFormat::Xls),
            "csv" => Ok(SpreadsheetFormat::Csv),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }

    pub fn parser(&self) -> Box<dyn FileParser> {
        match self {
            SpreadsheetFormat::Xlsx | SpreadsheetFormat::Xls => Box::new(ExcelParser::new(*self)),
            SpreadsheetFormat::Csv => Box::new(CsvParser),
        }
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser {
    format: SpreadsheetFormat,
}

impl ExcelParser {
    pub fn new(format: SpreadsheetFormat) -> Self {
        Self { format }
    }
}

impl FileParser for ExcelParser {
    fn parse_workbook(&self, reader: &mut dyn ReadSeek) -> ImporterResult<Workbook> {
        match self.format {
            SpreadsheetFormat::Xls => {
                let workbook: Xls<_> = Xls::new(reader)
                    .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;
                read_all_sheets(workbook)
            }
            _ => {
                let workbook: Xlsx<_> = Xlsx::new(reader)
                    .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;
                read_all_sheets(workbook)
            }
        }
    }
}

fn read_all_sheets<RS, W>(mut workbook: W) -> ImporterResult<Workbook>
where
    RS: Read + Seek,
    W: Reader<RS>,
    W::Error: std::fmt::Display,
{
    let mut sheets = Vec::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;
        sheets.push(Worksheet::new(sheet_name, range_to_rows(&range)));
    }
    Ok(Workbook { sheets })
}

/// calamine 的 Range 从第一个非空单元格开始，这里补齐偏移，保证第 1 行就是表头行
fn range_to_rows(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; start_col as usize];
        cells.extend(row.iter().map(CellValue::from_excel));
        rows.push(cells);
    }
    rows
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_workbook(&self, reader: &mut dyn ReadSeek) -> ImporterResult<Workbook> {
        let delimiter = sniff_delimiter(reader)?;

        // 表头作为普通第 1 行读取
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .delimiter(delimiter)
            .from_reader(reader);

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            rows.push(
                record
                    .iter()
                    .map(|value| {
                        if value.trim().is_empty() {
                            CellValue::Empty
                        } else {
                            CellValue::Text(value.to_string())
                        }
                    })
                    .collect(),
            );
        }

        Ok(Workbook {
            sheets: vec![Worksheet::new("csv", rows)],
        })
    }
}

/// 根据首行判断分隔符（`;` 多于 `,` 时视为分号分隔），读取后回到原位置
fn sniff_delimiter(reader: &mut dyn ReadSeek) -> ImporterResult<u8> {
    let start = reader.stream_position()?;
    let mut buf = [0u8; 4096];
    let read = reader.read(&mut buf)?;
    reader.seek(SeekFrom::Start(start))?;

    let first_line = buf[..read].split(|b| *b == b'\n').next().unwrap_or(&[]);
    let commas = first_line.iter().filter(|b| **b == b',').count();
    let semicolons = first_line.iter().filter(|b| **b == b';').count();

    Ok(if semicolons > commas { b';' } else { b',' })
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImporterResult<Workbook> {
        let path = file_path.as_ref();

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let format = SpreadsheetFormat::from_path(path)?;
        let mut reader = BufReader::new(File::open(path)?);
        format.parser().parse_workbook(&mut reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_csv_parser_keeps_header_as_first_row() {
        let mut cursor = Cursor::new(b"Nombres,Email\nAna,ana@x.com\n".to_vec());
        let workbook = CsvParser.parse_workbook(&mut cursor).unwrap();

        let sheet = workbook.first_sheet().unwrap();
        assert_eq!(
            sheet.header_row()[0],
            CellValue::Text("Nombres".to_string())
        );
        assert_eq!(sheet.cell(2, 2), &CellValue::Text("ana@x.com".to_string()));
        assert_eq!(sheet.data_row_count(), 1);
    }

    #[test]
    fn test_csv_parser_semicolon_delimiter() {
        let mut cursor = Cursor::new("Nombres;Salario\nAna;3,000,000\n".as_bytes().to_vec());
        let workbook = CsvParser.parse_workbook(&mut cursor).unwrap();

        let sheet = workbook.first_sheet().unwrap();
        assert_eq!(sheet.column_count(), 2);
        assert_eq!(sheet.cell(2, 2), &CellValue::Text("3,000,000".to_string()));
    }

    #[test]
    fn test_data_rows_skip_blank_and_keep_row_numbers() {
        let mut cursor = Cursor::new(b"A,B\n1,2\n,\n3,4\n".to_vec());
        let workbook = CsvParser.parse_workbook(&mut cursor).unwrap();
        let sheet = workbook.first_sheet().unwrap();

        let numbers: Vec<usize> = sheet.data_rows().map(|(n, _)| n).collect();
        assert_eq!(numbers, vec![2, 4]);
    }

    #[test]
    fn test_cell_out_of_bounds_is_empty() {
        let sheet = Worksheet::new("s", vec![vec![CellValue::Text("A".to_string())]]);
        assert_eq!(sheet.cell(5, 5), &CellValue::Empty);
        assert_eq!(sheet.cell(0, 1), &CellValue::Empty);
    }

    #[test]
    fn test_number_as_text_drops_integral_fraction() {
        assert_eq!(
            CellValue::Number(3001234567.0).as_text(),
            Some("3001234567".to_string())
        );
        assert_eq!(CellValue::Number(12.5).as_text(), Some("12.5".to_string()));
        assert_eq!(CellValue::Empty.as_text(), None);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            SpreadsheetFormat::from_path(Path::new("a/b/empleados.XLSX")).unwrap(),
            SpreadsheetFormat::Xlsx
        );
        assert_eq!(
            SpreadsheetFormat::from_path(Path::new("empleados.csv")).unwrap(),
            SpreadsheetFormat::Csv
        );
        assert!(SpreadsheetFormat::from_path(Path::new("empleados.pdf")).is_err());
    }

    #[test]
    fn test_universal_parser_file_not_found() {
        let result = UniversalFileParser.parse("non_existent.csv");
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_universal_parser_csv_file() {
        let mut temp_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "Nombres,Email").unwrap();
        writeln!(temp_file, "Ana,ana@x.com").unwrap();

        let workbook = UniversalFileParser.parse(temp_file.path()).unwrap();
        assert_eq!(workbook.sheets.len(), 1);
        assert_eq!(workbook.first_sheet().unwrap().data_row_count(), 1);
    }
}
