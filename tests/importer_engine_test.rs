// ==========================================
// 员工导入系统 - EmployeeImporter 集成测试
// ==========================================
// 覆盖: 结构校验 / 行错误不阻断批次 / 邮箱对账 upsert / 幂等重导 / xlsx+csv
// ==========================================


use std::io::{Cursor, Seek, SeekFrom, Write};
use talento_import::db::open_sqlite_connection;
use talento_import::importer::Workbook;
use talento_import::repository::EmployeeRepository;
use talento_import::{EmployeeImporter, EmployeeStatus, ImportOptions, SpreadsheetFormat};
use test_helpers::{
    ana_row, build_importer, create_test_db, csv_bytes, employee_row, xlsx_bytes, STANDARD_HEADERS,
};

async fn import_csv(
    importer: &test_helpers::TestImporter,
    headers: &[&str],
    rows: &[Vec<String>],
) -> talento_import::ImportResult {
    let mut cursor = Cursor::new(csv_bytes(headers, rows));
    importer
        .import_employees(&mut cursor, SpreadsheetFormat::Csv, Some("empleados.csv".to_string()))
        .await
}

// ==========================================
// 场景测试
// ==========================================

#[tokio::test]
async fn test_single_valid_row_is_inserted() {
    talento_import::logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = build_importer(&db_path, ImportOptions::default());

    let result = import_csv(&importer, &STANDARD_HEADERS, &[ana_row("Tecnología")]).await;

    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.total_rows, 1);
    assert_eq!(result.successful_imports, 1);
    assert_eq!(result.updated_records, 0);
    assert_eq!(result.failed_imports, 0);
    assert!(result.errors.is_empty());
    assert_eq!(result.file_name.as_deref(), Some("empleados.csv"));
    assert_eq!(result.warnings[0], "detected 12 columns in the file");

    let stored = importer.employee_repo().list().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].department_id, 6);
    assert_eq!(stored[0].status, EmployeeStatus::Active);
    assert_eq!(result.imported_employees[0].id, stored[0].id);
    assert_eq!(result.summaries[0].full_name, "Ana Pérez");
    assert_eq!(result.summaries[0].department, "Tecnología");
}

#[tokio::test]
async fn test_unknown_department_fails_the_batch() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = build_importer(&db_path, ImportOptions::default());

    let result = import_csv(&importer, &STANDARD_HEADERS, &[ana_row("Marketing2")]).await;

    assert!(!result.success);
    assert_eq!(result.failed_imports, 1);
    assert_eq!(result.successful_imports, 0);
    assert_eq!(result.errors, vec!["row 2: department not found: Marketing2".to_string()]);
    assert!(result.imported_employees.is_empty());
    assert!(importer.employee_repo().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_second_run_updates_instead_of_inserting() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = build_importer(&db_path, ImportOptions::default());

    let first = import_csv(&importer, &STANDARD_HEADERS, &[ana_row("Tecnología")]).await;
    assert_eq!(first.successful_imports, 1);

    let second = import_csv(&importer, &STANDARD_HEADERS, &[ana_row("Tecnología")]).await;
    assert!(second.success);
    assert_eq!(second.successful_imports, 0);
    assert_eq!(second.updated_records, 1);
    assert!(second.summaries[0].is_update);
    assert_ne!(first.import_id, second.import_id);

    assert_eq!(importer.employee_repo().list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_reimport_is_idempotent() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = build_importer(&db_path, ImportOptions::default());
    let rows = vec![
        employee_row("Ana", "ana@x.com", "Tecnología"),
        employee_row("Luis", "luis@x.com", "Ventas"),
        employee_row("Ana María", "ANA@x.com", "Contabilidad"), // 同批重复邮箱
        employee_row("Sin Depto", "sin@x.com", "Marketing2"),
    ];

    let first = import_csv(&importer, &STANDARD_HEADERS, &rows).await;
    let second = import_csv(&importer, &STANDARD_HEADERS, &rows).await;

    assert_eq!(second.successful_imports, 0);
    assert_eq!(
        second.updated_records,
        first.successful_imports + first.updated_records
    );
    assert_eq!(second.failed_imports, first.failed_imports);
    assert_eq!(importer.employee_repo().list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_duplicate_email_in_batch_is_last_write_wins() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = build_importer(&db_path, ImportOptions::default());
    let mut second = employee_row("Ana María", "ANA@X.COM", "Ventas");
    second[7] = "Líder".to_string();

    let result = import_csv(
        &importer,
        &STANDARD_HEADERS,
        &[ana_row("Tecnología"), second],
    )
    .await;

    assert_eq!(result.successful_imports, 1);
    assert_eq!(result.updated_records, 1);

    let stored = importer.employee_repo().list().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].email, "ana@x.com");
    assert_eq!(stored[0].first_name, "Ana María");
    assert_eq!(stored[0].position, "Líder");
    assert_eq!(stored[0].department_id, 5);
}

#[tokio::test]
async fn test_partial_failure_is_reported_as_success() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = build_importer(&db_path, ImportOptions::default());
    let mut no_name = employee_row("", "nn@x.com", "Ventas");
    no_name[0] = "   ".to_string();
    let mut bad_salary = employee_row("Luis", "luis@x.com", "Ventas");
    bad_salary[8] = "mucho".to_string();

    let result = import_csv(
        &importer,
        &STANDARD_HEADERS,
        &[ana_row("Tecnología"), no_name, bad_salary],
    )
    .await;

    assert!(result.success);
    assert_eq!(result.total_rows, 3);
    assert_eq!(result.successful_imports, 1);
    assert_eq!(result.failed_imports, 2);
    assert_eq!(
        result.errors,
        vec![
            "row 3: field 'Nombres' is required".to_string(),
            "row 4: salary must be a valid number".to_string(),
        ]
    );
    assert!(result
        .imported_employees
        .iter()
        .all(|e| e.email != "nn@x.com"));
}

#[tokio::test]
async fn test_update_disabled_rejects_existing_emails() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = build_importer(&db_path, ImportOptions::default());
    import_csv(&importer, &STANDARD_HEADERS, &[ana_row("Tecnología")]).await;

    let strict = build_importer(
        &db_path,
        ImportOptions {
            update_existing: false,
            ..ImportOptions::default()
        },
    );
    let result = import_csv(&strict, &STANDARD_HEADERS, &[ana_row("Tecnología")]).await;

    assert!(!result.success);
    assert_eq!(result.errors, vec!["row 2: email already exists: ana@x.com".to_string()]);
}

// ==========================================
// 结构校验
// ==========================================

#[tokio::test]
async fn test_missing_columns_abort_before_any_row() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = build_importer(&db_path, ImportOptions::default());
    let headers: Vec<&str> = STANDARD_HEADERS
        .iter()
        .copied()
        .filter(|h| *h != "Email" && *h != "Cargo")
        .collect();
    let mut row = ana_row("Tecnología");
    row.remove(7);
    row.remove(2);

    let result = import_csv(&importer, &headers, &[row]).await;

    assert!(!result.success);
    assert_eq!(result.errors, vec!["missing required columns: Email, Cargo".to_string()]);
    assert_eq!(result.warnings, vec!["detected 10 columns in the file".to_string()]);
    assert_eq!(result.total_rows, 0);
    assert_eq!(result.failed_imports, 0);
    assert!(importer.employee_repo().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_header_only_file_has_no_data_rows() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = build_importer(&db_path, ImportOptions::default());

    let result = import_csv(&importer, &STANDARD_HEADERS, &[]).await;

    assert!(!result.success);
    assert_eq!(
        result.errors,
        vec!["the file does not contain employee data rows".to_string()]
    );
}

#[tokio::test]
async fn test_workbook_without_sheets_is_rejected() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = build_importer(&db_path, ImportOptions::default());

    let result = importer
        .import_workbook(&Workbook::default(), Some("vacio.xlsx".to_string()))
        .await;

    assert!(!result.success);
    assert_eq!(
        result.errors,
        vec!["the file does not contain any worksheet".to_string()]
    );
    assert!(result.warnings.is_empty());
    assert_eq!(result.total_rows, 0);
    assert!(importer.employee_repo().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_validate_structure_does_not_write() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = build_importer(&db_path, ImportOptions::default());
    let mut headers = STANDARD_HEADERS.to_vec();
    headers.push("Hobby");
    let mut row = ana_row("Tecnología");
    row.push("Ajedrez".to_string());
    let mut cursor = Cursor::new(csv_bytes(&headers, &[row]));

    let result = importer
        .validate_structure(&mut cursor, SpreadsheetFormat::Csv)
        .await;

    assert!(result.success);
    assert_eq!(result.total_rows, 1);
    assert_eq!(result.warnings[0], "detected 13 columns in the file");
    assert!(result.warnings[1].contains("Hobby"));
    assert!(importer.employee_repo().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unsupported_and_missing_files() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = build_importer(&db_path, ImportOptions::default());

    let missing = importer.import_from_file("no_such_file.xlsx").await;
    assert!(!missing.success);
    assert!(missing.errors[0].starts_with("file not found"));

    let pdf = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    let unsupported = importer.import_from_file(pdf.path()).await;
    assert!(!unsupported.success);
    assert_eq!(unsupported.errors.len(), 1);
    assert!(unsupported.errors[0].starts_with("unsupported file format"));
}

// ==========================================
// 文件格式与列顺序
// ==========================================

#[tokio::test]
async fn test_xlsx_file_with_permuted_columns() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = build_importer(&db_path, ImportOptions::default());

    // 倒序列
    let headers: Vec<&str> = STANDARD_HEADERS.iter().rev().copied().collect();
    let rows: Vec<Vec<String>> = [ana_row("Tecnología"), employee_row("Luis", "luis@x.com", "Ventas")]
        .into_iter()
        .map(|mut r| {
            r.reverse();
            r
        })
        .collect();

    let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    file.write_all(&xlsx_bytes(&headers, &rows)).unwrap();
    file.flush().unwrap();

    let result = importer.import_from_file(file.path()).await;

    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.successful_imports, 2);

    let stored = importer.employee_repo().list().await.unwrap();
    let ana = stored.iter().find(|e| e.email == "ana@x.com").unwrap();
    assert_eq!(ana.phone, "3001234567");
    assert_eq!(ana.salary, 3_000_000.0);
    assert_eq!(ana.birth_date, chrono::NaiveDate::from_ymd_opt(1990, 1, 1).unwrap());
    assert_eq!(ana.hire_date, chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
}

#[tokio::test]
async fn test_reader_is_rewound_before_reading() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = build_importer(&db_path, ImportOptions::default());
    let mut cursor = Cursor::new(xlsx_bytes(&STANDARD_HEADERS, &[ana_row("Tecnología")]));
    cursor.seek(SeekFrom::End(0)).unwrap();

    let result = importer
        .import_employees(&mut cursor, SpreadsheetFormat::Xlsx, None)
        .await;

    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.successful_imports, 1);
}

#[tokio::test]
async fn test_synonym_headers_and_optional_columns() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = build_importer(&db_path, ImportOptions::default());
    let headers = [
        "Cédula",
        "First Name",
        "Last Name",
        "Correo Electrónico",
        "Celular",
        "Domicilio",
        "Fecha Nacimiento",
        "Fecha Ingreso",
        "Puesto",
        "Sueldo",
        "Status",
        "Educación",
        "Área",
        "Perfil Profesional",
    ];
    let mut row = vec!["1020304050".to_string()];
    row.extend(ana_row("tecnología"));
    row[9] = "$3,000,000".to_string();
    row[10] = "vacaciones".to_string();
    row[11] = "Tecnico".to_string();
    row.push("  Analista de datos ".to_string());

    let result = import_csv(&importer, &headers, &[row]).await;

    assert!(result.success, "errors: {:?}", result.errors);
    let stored = importer.employee_repo().list().await.unwrap();
    assert_eq!(stored[0].document_number.as_deref(), Some("1020304050"));
    assert_eq!(stored[0].status, EmployeeStatus::Vacation);
    assert_eq!(
        stored[0].education_level,
        talento_import::EducationLevel::Technical
    );
    assert_eq!(
        stored[0].professional_profile.as_deref(),
        Some("Analista de datos")
    );
}

// ==========================================
// 提交失败
// ==========================================

#[tokio::test]
async fn test_commit_failure_is_a_single_system_error() {
    let (_tmp, db_path) = create_test_db().unwrap();
    {
        let conn = open_sqlite_connection(&db_path).unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_employee BEFORE INSERT ON employee
             BEGIN SELECT RAISE(ABORT, 'boom'); END;",
        )
        .unwrap();
    }
    let importer = build_importer(&db_path, ImportOptions::default());

    let result = import_csv(&importer, &STANDARD_HEADERS, &[ana_row("Tecnología")]).await;

    assert!(!result.success);
    assert_eq!(result.successful_imports, 1);
    assert_eq!(result.failed_imports, 0);
    assert_eq!(
        result.errors,
        vec!["system error: database query failed: boom".to_string()]
    );
    assert!(importer.employee_repo().list().await.unwrap().is_empty());
}
