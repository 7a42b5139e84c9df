// Command-line driver: import an employee spreadsheet into a SQLite database.
//
// Usage:
//   cargo run --bin import_employees -- <db_path> <file_path>
//
// The schema is created when missing. The ImportResult is printed to stdout as JSON;
// the exit code is non-zero when the import is reported as failed.

use anyhow::Context;
use std::sync::{Arc, Mutex};
use talento_import::db::{init_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use talento_import::{
    logging, ConfigManager, DepartmentRepositoryImpl, EmployeeImporter, EmployeeImporterImpl,
    EmployeeRepositoryImpl,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let db_path = args
        .next()
        .unwrap_or_else(|| "talento.db".to_string());
    let file_path = args
        .next()
        .context("usage: import_employees <db_path> <file_path>")?;

    let conn = open_sqlite_connection(&db_path)
        .with_context(|| format!("cannot open database {}", db_path))?;
    init_schema(&conn).context("cannot initialize schema")?;
    if let Some(version) = read_schema_version(&conn)? {
        if version > CURRENT_SCHEMA_VERSION {
            tracing::warn!(version, expected = CURRENT_SCHEMA_VERSION, "database schema is newer than this tool");
        }
    }
    let conn = Arc::new(Mutex::new(conn));

    let config = ConfigManager::from_connection(conn.clone())
        .map_err(|e| anyhow::anyhow!("cannot open config: {}", e))?;
    let importer = EmployeeImporterImpl::new(
        EmployeeRepositoryImpl::from_connection(conn.clone()),
        DepartmentRepositoryImpl::from_connection(conn),
        config,
    );

    let result = importer.import_from_file(&file_path).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}
