// ==========================================
// 员工导入系统 - 员工导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到数据库
// 流程: 解析（一次）→ 结构校验 → 表头映射 → 行校验 → 对账 → 汇总 → 提交
// 约束: 逐行顺序处理；行错误不阻断批次；结构错误在任何一行之前中止
// ==========================================

use crate::config::{ImportConfigReader, ImportOptions};
use crate::domain::ImportResult;
use crate::importer::data_cleaner::DataCleaner as DataCleanerImpl;
use crate::importer::employee_importer_trait::{DataCleaner, EmployeeImporter};
use crate::importer::error::{ImportError, ImporterResult, StructuralError};
use crate::importer::file_parser::{SpreadsheetFormat, UniversalFileParser, Workbook, Worksheet};
use crate::importer::header_mapper::{ColumnMapping, HeaderMapper};
use crate::importer::reconciliation::{ReconciliationEngine, StagedChange};
use crate::importer::result_aggregator::ResultAggregator;
use crate::importer::row_parser::{DepartmentTable, RowParser};
use crate::repository::{DepartmentRepository, EmployeeRepository, RepositoryResult};
use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 单次导入使用的组件（按导入选项构建）
struct Pipeline {
    header_mapper: HeaderMapper,
    row_parser: RowParser,
    update_existing: bool,
}

// ==========================================
// EmployeeImporterImpl - 员工导入器实现
// ==========================================
pub struct EmployeeImporterImpl<E, D, C>
where
    E: EmployeeRepository,
    D: DepartmentRepository,
    C: ImportConfigReader,
{
    // 数据访问层
    employee_repo: E,
    department_repo: D,

    // 配置读取器
    config: C,
}

impl<E, D, C> EmployeeImporterImpl<E, D, C>
where
    E: EmployeeRepository,
    D: DepartmentRepository,
    C: ImportConfigReader,
{
    /// 创建新的 EmployeeImporter 实例
    ///
    /// # 参数
    /// - employee_repo: 员工仓储（记录存储）
    /// - department_repo: 部门仓储（部门查找）
    /// - config: 配置读取器
    pub fn new(employee_repo: E, department_repo: D, config: C) -> Self {
        Self {
            employee_repo,
            department_repo,
            config,
        }
    }

    pub fn employee_repo(&self) -> &E {
        &self.employee_repo
    }

    /// 读取导入选项；读取失败时使用默认值
    async fn load_options(&self) -> ImportOptions {
        match self.config.load_import_options().await {
            Ok(options) => options,
            Err(e) => {
                warn!(error = %e, "failed to read import options, using defaults");
                ImportOptions::default()
            }
        }
    }

    fn build_pipeline(options: &ImportOptions) -> Pipeline {
        let cleaner = || -> Box<dyn DataCleaner> {
            Box::new(DataCleanerImpl::new(options.date_formats.clone()))
        };
        Pipeline {
            header_mapper: HeaderMapper::new(cleaner(), options.report_unmapped_columns),
            row_parser: RowParser::new(cleaner()),
            update_existing: options.update_existing,
        }
    }

    /// 回到流起点后解析整个工作簿
    fn read_workbook<R: Read + Seek>(
        reader: &mut R,
        format: SpreadsheetFormat,
    ) -> ImporterResult<Workbook> {
        reader.seek(SeekFrom::Start(0))?;
        format.parser().parse_workbook(reader)
    }

    /// 结构校验：工作表 → 表头映射 → 数据行
    ///
    /// 找到工作表后，表头列数总是写入警告（校验失败时同样保留）。
    fn check_structure<'w>(
        workbook: &'w Workbook,
        header_mapper: &HeaderMapper,
        aggregator: &mut ResultAggregator,
    ) -> Result<(&'w Worksheet, ColumnMapping), StructuralError> {
        let sheet = workbook.first_sheet().ok_or(StructuralError::NoWorksheet)?;

        let header = header_mapper.map_headers(sheet.header_row());
        aggregator.add_warning(format!("detected {} columns in the file", header.header_count));
        if !header.mapping.is_valid() {
            let missing = header
                .mapping
                .missing_fields()
                .iter()
                .map(|f| f.label().to_string())
                .collect();
            return Err(StructuralError::MissingColumns(missing));
        }
        aggregator.add_warnings(header.warnings);

        if sheet.data_row_count() == 0 {
            return Err(StructuralError::NoDataRows);
        }

        Ok((sheet, header.mapping))
    }

    /// 逐行处理工作簿并提交
    async fn process_workbook(
        &self,
        workbook: &Workbook,
        options: &ImportOptions,
        mut aggregator: ResultAggregator,
        started: Instant,
    ) -> ImportResult {
        let pipeline = Self::build_pipeline(options);

        // === 步骤 1: 结构校验 / 表头映射 ===
        debug!("step 1: structure check");
        let (sheet, mapping) =
            match Self::check_structure(workbook, &pipeline.header_mapper, &mut aggregator) {
                Ok(found) => found,
                Err(e) => {
                    warn!(error = %e, "structural validation failed");
                    aggregator.record_structural_failure(&ImportError::from(e));
                    return aggregator.finish(elapsed_ms(started));
                }
            };
        aggregator.set_total_rows(sheet.data_row_count());

        // === 步骤 2: 部门表 / 员工快照（各读一次）===
        debug!("step 2: load departments and snapshot");
        let departments = match self.department_repo.list().await {
            Ok(list) => DepartmentTable::new(list),
            Err(e) => {
                error!(error = %e, "failed to load departments");
                aggregator.record_system_error(e.to_string());
                return aggregator.finish(elapsed_ms(started));
            }
        };
        let snapshot = match self.employee_repo.list().await {
            Ok(list) => list,
            Err(e) => {
                error!(error = %e, "failed to load employee snapshot");
                aggregator.record_system_error(e.to_string());
                return aggregator.finish(elapsed_ms(started));
            }
        };
        debug!(
            departments = departments.len(),
            employees = snapshot.len(),
            "reference data loaded"
        );
        let mut engine = ReconciliationEngine::new(snapshot, pipeline.update_existing);

        // === 步骤 3: 逐行 校验 → 对账 ===
        debug!("step 3: process rows");
        for (row_number, cells) in sheet.data_rows() {
            let outcome = pipeline
                .row_parser
                .parse_row(row_number, cells, &mapping, &departments)
                .and_then(|candidate| {
                    let department = candidate.department.name.clone();
                    engine
                        .reconcile(candidate)
                        .map(|reconciled| (reconciled, department))
                });

            match outcome {
                Ok((reconciled, department)) => {
                    aggregator.record_success(row_number, reconciled, &department);
                }
                Err(reason) => {
                    warn!(row = row_number, reason = %reason, "row rejected");
                    aggregator.record_row_failure(row_number, reason);
                }
            }
        }

        // === 步骤 4: 提交 ===
        let changes = engine.staged_changes();
        debug!(changes = changes.len(), "step 4: commit");
        match self.persist(changes).await {
            Ok(written) => {
                debug!(written, "batch committed");
                self.backfill_ids(&mut aggregator).await;
            }
            Err(e) => {
                error!(error = %e, "batch commit failed");
                aggregator.record_system_error(e.to_string());
            }
        }

        aggregator.finish(elapsed_ms(started))
    }

    async fn persist(&self, changes: Vec<StagedChange>) -> RepositoryResult<usize> {
        for change in changes {
            match change {
                StagedChange::Add(employee) => self.employee_repo.add(employee).await?,
                StagedChange::Update(employee) => self.employee_repo.update(employee).await?,
            }
        }
        self.employee_repo.commit().await
    }

    /// 提交后回填新建员工的 id
    async fn backfill_ids(&self, aggregator: &mut ResultAggregator) {
        if aggregator.current().successful_imports == 0 {
            return;
        }
        match self.employee_repo.list().await {
            Ok(stored) => {
                let ids: HashMap<String, i64> = stored
                    .iter()
                    .filter_map(|e| e.id.map(|id| (e.natural_key(), id)))
                    .collect();
                aggregator.assign_ids(&ids);
            }
            Err(e) => warn!(error = %e, "failed to reload ids after commit"),
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

/// 文件无法读取时的报告（未进入结构校验）
fn unreadable_file(err: &ImportError, file_name: Option<String>, started: Instant) -> ImportResult {
    warn!(error = %err, "cannot read import file");
    let mut aggregator = ResultAggregator::new(Uuid::new_v4().to_string(), file_name);
    aggregator.record_structural_failure(err);
    let result = aggregator.finish(elapsed_ms(started));
    log_finished(&result);
    result
}

fn log_finished(result: &ImportResult) {
    info!(
        import_id = %result.import_id,
        total = result.total_rows,
        inserted = result.successful_imports,
        updated = result.updated_records,
        failed = result.failed_imports,
        success = result.success,
        elapsed_ms = result.elapsed_ms,
        "employee import finished"
    );
}

#[async_trait::async_trait]
impl<E, D, C> EmployeeImporter for EmployeeImporterImpl<E, D, C>
where
    E: EmployeeRepository + Send + Sync,
    D: DepartmentRepository + Send + Sync,
    C: ImportConfigReader + Send + Sync,
{
    #[instrument(skip(self, reader))]
    async fn validate_structure<R: Read + Seek + Send>(
        &self,
        reader: &mut R,
        format: SpreadsheetFormat,
    ) -> ImportResult {
        let started = Instant::now();
        let options = self.load_options().await;
        let pipeline = Self::build_pipeline(&options);
        let mut aggregator = ResultAggregator::new(Uuid::new_v4().to_string(), None);

        let checked = Self::read_workbook(reader, format).and_then(|workbook| {
            Self::check_structure(&workbook, &pipeline.header_mapper, &mut aggregator)
                .map(|(sheet, _)| sheet.data_row_count())
                .map_err(ImportError::from)
        });

        match checked {
            Ok(data_rows) => aggregator.set_total_rows(data_rows),
            Err(e) => {
                warn!(error = %e, "structural validation failed");
                aggregator.record_structural_failure(&e);
            }
        }

        aggregator.finish(elapsed_ms(started))
    }

    #[instrument(skip(self, reader))]
    async fn import_employees<R: Read + Seek + Send>(
        &self,
        reader: &mut R,
        format: SpreadsheetFormat,
        file_name: Option<String>,
    ) -> ImportResult {
        let started = Instant::now();
        match Self::read_workbook(reader, format) {
            Ok(workbook) => self.import_workbook(&workbook, file_name).await,
            Err(e) => unreadable_file(&e, file_name, started),
        }
    }

    #[instrument(skip(self, file_path))]
    async fn import_from_file<P: AsRef<Path> + Send>(&self, file_path: P) -> ImportResult {
        let started = Instant::now();
        let path = file_path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        info!(file_path = %path.display(), "import from file");

        match UniversalFileParser.parse(path) {
            Ok(workbook) => self.import_workbook(&workbook, file_name).await,
            Err(e) => unreadable_file(&e, file_name, started),
        }
    }

    #[instrument(skip(self, workbook), fields(import_id))]
    async fn import_workbook(&self, workbook: &Workbook, file_name: Option<String>) -> ImportResult {
        let started = Instant::now();
        let import_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("import_id", import_id.as_str());
        info!(
            import_id = %import_id,
            file_name = ?file_name,
            sheets = workbook.sheets.len(),
            "employee import started"
        );

        let options = self.load_options().await;
        let aggregator = ResultAggregator::new(import_id, file_name);
        let result = self
            .process_workbook(workbook, &options, aggregator, started)
            .await;
        log_finished(&result);
        result
    }
}
