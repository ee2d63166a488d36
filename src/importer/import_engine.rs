// ==========================================
// 人力资源管理后台 - 导入引擎
// ==========================================
// 职责: 单批次导入的编排（全有或全无）
// 流程: 第一阶段 查重 → 字段校验 → 记录处理 → 组合唯一（逐行，不写库）
//      第二阶段 按自然键定位 → 依赖实体（更新时原地改写）→ upsert（单事务）→ 提交后派发事件
// 状态: START → VALIDATING → ALL_VALID → COMMITTING → COMMITTED | ROLLED_BACK
//                         → ANY_INVALID → REJECTED
// ==========================================

use crate::config::{ImportConfig, ImportConfigReader};
use crate::domain::import_result::{EntitySummary, ImportBatchResult, InvalidRow};
use crate::domain::row::{DependentRecord, FieldValue, ProcessedRecord, RawRow, ValidationResult};
use crate::domain::schema::{ImportSchema, TemplateData};
use crate::domain::types::{BatchState, EntityKind, ImportAction, ImportErrorType};
use crate::events::{EventDispatcher, EventNotifier, NoOpEventDispatcher, NotifyOutcome};
use crate::i18n::Messages;
use crate::importer::duplicate_detector::{BatchClaims, CompositeKey, DuplicateDetector};
use crate::importer::entity_resolver::EntityResolver;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::error_translator::ErrorTranslator;
use crate::importer::field_validator::FieldValidator;
use crate::importer::observer::{ImportObserver, TracingObserver};
use crate::importer::processors::{
    natural_key_of, process_record, ProcessingContext, ProcessorRegistry, RecordProcessor,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::import_log_repo::{ImportBatchLog, ImportBatchLogRepository};
use crate::repository::import_repo::RecordStore;
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, TransactionBehavior};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use uuid::Uuid;

// ==========================================
// 内部类型
// ==========================================

/// 通过第一阶段的行
struct ValidRecord {
    row: usize,
    raw: RawRow,
    record: ProcessedRecord,
}

/// 提交阶段失败
struct CommitFailure {
    row: usize,
    errors: ValidationResult,
    cause: String,
}

/// 批次状态推进（非法迁移视为内部错误）
fn advance(state: &mut BatchState, next: BatchState) -> ImportResult<()> {
    if !state.can_transition_to(next) {
        return Err(ImportError::InternalError(format!(
            "非法的批次状态迁移: {} -> {}",
            state, next
        )));
    }
    *state = next;
    Ok(())
}

/// 写入依赖实体: 已关联且仍存在则原地更新，否则插入新记录；返回依赖记录 id
fn write_dependent(
    store: &RecordStore<'_>,
    dependent: &DependentRecord,
    linked: Option<i64>,
    now: &str,
) -> RepositoryResult<i64> {
    if let Some(dep_id) = linked {
        if store.update_record(dependent.table, dep_id, &dependent.data)? > 0 {
            return Ok(dep_id);
        }
    }

    let mut dep_data = dependent.data.clone();
    dep_data.insert("created_at".to_string(), FieldValue::text(now));
    store.insert_record(dependent.table, &dep_data)
}

// ==========================================
// ImportEngine - 导入引擎
// ==========================================
pub struct ImportEngine {
    conn: Arc<Mutex<Connection>>,
    config: ImportConfig,
    messages: Messages,
    processors: ProcessorRegistry,
    notifier: EventNotifier,
    observer: Arc<dyn ImportObserver>,
    audit_repo: ImportBatchLogRepository,
}

impl ImportEngine {
    /// 创建导入引擎
    ///
    /// # 参数
    /// - conn: 共享数据库连接（每个阶段单独加锁）
    /// - config: 导入配置快照
    pub fn new(conn: Arc<Mutex<Connection>>, config: ImportConfig) -> ImportResult<Self> {
        let processors = ProcessorRegistry::new()?;
        let messages = Messages::new(&config.locale);
        let notifier =
            EventNotifier::new(config.event_namespace.clone(), Arc::new(NoOpEventDispatcher));

        Ok(Self {
            audit_repo: ImportBatchLogRepository::new(conn.clone()),
            conn,
            config,
            messages,
            processors,
            notifier,
            observer: Arc::new(TracingObserver),
        })
    }

    /// 从配置读取器创建导入引擎
    pub fn from_config_reader<C: ImportConfigReader>(
        conn: Arc<Mutex<Connection>>,
        reader: &C,
    ) -> ImportResult<Self> {
        let config = reader
            .load_import_config()
            .map_err(|e| ImportError::ConfigReadError {
                key: "import.*".to_string(),
                message: e.to_string(),
            })?;
        Self::new(conn, config)
    }

    /// 替换事件派发器
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        self.notifier = EventNotifier::new(self.config.event_namespace.clone(), dispatcher);
        self
    }

    /// 替换观察者
    pub fn with_observer(mut self, observer: Arc<dyn ImportObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// 可导入实体列表
    pub fn entities(&self) -> Vec<EntityKind> {
        self.processors.entities()
    }

    fn processor(&self, entity: &str) -> ImportResult<&dyn RecordProcessor> {
        let kind = EntityKind::from_slug(entity)
            .ok_or_else(|| ImportError::UnknownEntity(entity.to_string()))?;
        self.processors.get(kind)
    }

    fn get_conn(&self) -> ImportResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ImportError::LockError(e.to_string()))
    }

    // ==========================================
    // Schema / 模板
    // ==========================================

    pub fn get_schema(&self, entity: &str) -> ImportResult<&ImportSchema> {
        Ok(self.processor(entity)?.schema())
    }

    pub fn get_template_data(&self, entity: &str) -> ImportResult<TemplateData> {
        let processor = self.processor(entity)?;
        Ok(processor
            .schema()
            .template_data(processor.example_rows(), &self.messages))
    }

    // ==========================================
    // 批次导入
    // ==========================================

    /// 导入一个批次
    ///
    /// # 参数
    /// - entity: 实体 slug（如 `empleados`）
    /// - rows: 已解析的行（按表头或字段名取值）
    /// - actor: 导入人（写入 imported_by 与事件）
    ///
    /// # 返回
    /// 行级失败体现在 `ImportBatchResult` 中；Err 只表示引擎层面的异常
    pub fn import(&self, entity: &str, rows: Vec<RawRow>, actor: &str) -> ImportResult<ImportBatchResult> {
        let processor = self.processor(entity)?;
        let kind = processor.entity();
        let batch_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        let mut state = BatchState::Start;

        self.observer.batch_started(&batch_id, kind, rows.len(), actor);

        // ===== 批次级前置检查 =====
        let precheck = if rows.is_empty() {
            Some(self.messages.text("batch.empty"))
        } else if rows.len() > self.config.max_batch_rows {
            Some(self.messages.text_with(
                "batch.too_many_rows",
                &[
                    ("count", &rows.len().to_string()),
                    ("max", &self.config.max_batch_rows.to_string()),
                ],
            ))
        } else {
            None
        };
        if let Some(message) = precheck {
            advance(&mut state, BatchState::Rejected)?;
            self.observer.batch_rejected(&batch_id, 0);
            let result =
                ImportBatchResult::failed(batch_id, kind, state, Vec::new(), Vec::new(), message);
            self.write_audit(&result, actor, rows.len(), started);
            return Ok(result);
        }

        // ===== 第一阶段: 校验 =====
        advance(&mut state, BatchState::Validating)?;
        let total_rows = rows.len();
        let today = Utc::now().date_naive();
        let (valid, invalid) = {
            let conn = self.get_conn()?;
            self.validate_rows(processor, &conn, &batch_id, rows, today)
        };
        self.observer
            .validation_finished(&batch_id, valid.len(), invalid.len());

        if !invalid.is_empty() {
            advance(&mut state, BatchState::AnyInvalid)?;
            advance(&mut state, BatchState::Rejected)?;
            self.observer.batch_rejected(&batch_id, invalid.len());

            let message = self
                .messages
                .text_with("batch.rejected", &[("count", &invalid.len().to_string())]);
            let valid_rows = valid.into_iter().map(|v| v.raw).collect();
            let result = ImportBatchResult::failed(batch_id, kind, state, valid_rows, invalid, message);
            self.write_audit(&result, actor, total_rows, started);
            return Ok(result);
        }

        // ===== 第二阶段: 提交 =====
        advance(&mut state, BatchState::AllValid)?;
        advance(&mut state, BatchState::Committing)?;
        let now = Utc::now().to_rfc3339();
        let committed = {
            let mut conn = self.get_conn()?;
            self.commit_records(processor, &mut conn, &batch_id, &valid, actor, &now)
        };

        let result = match committed {
            Ok(summaries) => {
                advance(&mut state, BatchState::Committed)?;
                self.dispatch_events(&summaries, actor, &batch_id);

                let created = summaries
                    .iter()
                    .filter(|s| s.action == ImportAction::Created)
                    .count();
                let updated = summaries.len() - created;
                let message = self.messages.text_with(
                    "batch.committed",
                    &[
                        ("count", &summaries.len().to_string()),
                        ("created", &created.to_string()),
                        ("updated", &updated.to_string()),
                    ],
                );
                self.observer.batch_committed(
                    &batch_id,
                    created,
                    updated,
                    started.elapsed().as_millis(),
                );
                let valid_rows = valid.into_iter().map(|v| v.raw).collect();
                ImportBatchResult::committed(batch_id, kind, valid_rows, summaries, message)
            }
            Err(failure) => {
                advance(&mut state, BatchState::RolledBack)?;
                self.observer
                    .batch_rolled_back(&batch_id, failure.row, &failure.cause);

                let message = self
                    .messages
                    .text_with("batch.rolled_back", &[("row", &failure.row.to_string())]);
                let mut valid_rows = Vec::with_capacity(valid.len());
                let mut invalid_rows = Vec::new();
                for v in valid {
                    if v.row == failure.row {
                        invalid_rows.push(InvalidRow {
                            row: v.row,
                            data: v.raw,
                            errors: failure.errors.clone(),
                            error_type: ImportErrorType::DatabaseError,
                        });
                    } else {
                        valid_rows.push(v.raw);
                    }
                }
                ImportBatchResult::failed(batch_id, kind, state, valid_rows, invalid_rows, message)
            }
        };

        self.write_audit(&result, actor, total_rows, started);
        Ok(result)
    }

    /// 第一阶段: 逐行校验（只读，所有行都会被检查）
    fn validate_rows(
        &self,
        processor: &dyn RecordProcessor,
        conn: &Connection,
        batch_id: &str,
        rows: Vec<RawRow>,
        today: NaiveDate,
    ) -> (Vec<ValidRecord>, Vec<InvalidRow>) {
        let store = RecordStore::new(conn);
        let mut resolver = EntityResolver::new(self.config.resolver_full_scan_limit);
        let mut claims = BatchClaims::new();
        let mut valid = Vec::new();
        let mut invalid = Vec::new();

        for (index, raw) in rows.into_iter().enumerate() {
            let row_number = index + 1;
            let mut ctx = ProcessingContext {
                store,
                resolver: &mut resolver,
                messages: &self.messages,
                today,
            };

            match self.validate_row(processor, &mut ctx, &raw, row_number, &mut claims) {
                Ok(record) => valid.push(ValidRecord {
                    row: row_number,
                    raw,
                    record,
                }),
                Err((error_type, errors)) => {
                    let invalid_row = InvalidRow {
                        row: row_number,
                        data: raw,
                        errors,
                        error_type,
                    };
                    self.observer.row_rejected(batch_id, &invalid_row);
                    invalid.push(invalid_row);
                }
            }
        }

        (valid, invalid)
    }

    /// 单行校验，首个失败阶段决定错误类型
    fn validate_row(
        &self,
        processor: &dyn RecordProcessor,
        ctx: &mut ProcessingContext<'_, '_>,
        row: &RawRow,
        row_number: usize,
        claims: &mut BatchClaims,
    ) -> Result<ProcessedRecord, (ImportErrorType, ValidationResult)> {
        let schema = processor.schema();
        let unexpected = || {
            let mut errors = ValidationResult::new();
            errors.add_message(self.messages.text("processing.unexpected"));
            (ImportErrorType::Processing, errors)
        };

        // 自然键命中的已有记录（upsert 时查重排除自身）
        let exclude_id = match natural_key_of(processor, row) {
            Some(key) => ctx
                .store
                .find_id_by(schema.entity.table(), &key.column, &key.value)
                .map_err(|_| unexpected())?,
            None => None,
        };

        // ===== 查重 =====
        let detector = DuplicateDetector::new(&self.messages);
        let duplicates = detector
            .check(&ctx.store, schema, row, exclude_id, claims)
            .map_err(|_| unexpected())?;
        if !duplicates.is_valid() {
            return Err((ImportErrorType::Duplicate, duplicates));
        }
        detector.claim_row(schema, row, row_number, claims);

        // ===== 字段校验 =====
        let validation = FieldValidator::new(&self.messages).validate(row, schema);
        if !validation.is_valid() {
            return Err((ImportErrorType::Validation, validation));
        }

        // ===== 记录处理 =====
        let record = process_record(processor, ctx, row).map_err(|_| unexpected())?;
        if !record.is_ready() {
            return Err((ImportErrorType::Processing, record.errors));
        }

        // ===== 组合唯一（依赖解析后的 id）=====
        if let Some(key) = CompositeKey::from_record(schema, processor.composite_unique(), &record) {
            let duplicates = detector
                .check_composite(&ctx.store, schema, &key, claims)
                .map_err(|_| unexpected())?;
            if !duplicates.is_valid() {
                return Err((ImportErrorType::Duplicate, duplicates));
            }
            detector.claim_composite(&key, row_number, claims);
        }

        Ok(record)
    }

    /// 第二阶段: 单事务写入；任一失败则整体回滚
    fn commit_records(
        &self,
        processor: &dyn RecordProcessor,
        conn: &mut Connection,
        batch_id: &str,
        records: &[ValidRecord],
        actor: &str,
        now: &str,
    ) -> Result<Vec<EntitySummary>, CommitFailure> {
        let schema = processor.schema();
        let translator = ErrorTranslator::new(&self.messages);
        let first_row = records.first().map(|r| r.row).unwrap_or(1);
        let fail = |row: usize, err: RepositoryError| CommitFailure {
            row,
            errors: translator.translate(schema, &err),
            cause: err.to_string(),
        };

        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| fail(first_row, RepositoryError::from(e)))?;

        let mut summaries = Vec::with_capacity(records.len());
        {
            let store = RecordStore::new(&tx);
            let table = schema.entity.table();

            for valid in records {
                let mut data = valid.record.data.clone();

                // ===== 事务内重新按自然键查找（决定 upsert 方向）=====
                let existing = match &valid.record.natural_key {
                    Some(key) => store
                        .find_id_by(table, &key.column, &key.value)
                        .map_err(|e| fail(valid.row, e))?,
                    None => None,
                };

                // ===== 依赖实体: 更新时原地改写已关联的记录，否则新建 =====
                for dependent in &valid.record.dependents {
                    let linked = match existing {
                        Some(id) => store.get_integer(table, id, &dependent.column),
                        None => Ok(None),
                    };
                    let written = linked.and_then(|linked| {
                        write_dependent(&store, dependent, linked, now)
                    });
                    match written {
                        Ok(dep_id) => {
                            data.insert(dependent.column.clone(), FieldValue::Integer(dep_id));
                        }
                        Err(e) => {
                            // Transaction 析构时回滚
                            return Err(CommitFailure {
                                row: valid.row,
                                errors: translator.translate_dependent(schema, &dependent.field),
                                cause: e.to_string(),
                            });
                        }
                    }
                }

                data.insert("imported_by".to_string(), FieldValue::text(actor));
                data.insert("updated_at".to_string(), FieldValue::text(now));

                let (id, action) = match existing {
                    Some(id) => {
                        store
                            .update_record(table, id, &data)
                            .map_err(|e| fail(valid.row, e))?;
                        (id, ImportAction::Updated)
                    }
                    None => {
                        data.insert("created_at".to_string(), FieldValue::text(now));
                        let id = store
                            .insert_record(table, &data)
                            .map_err(|e| fail(valid.row, e))?;
                        (id, ImportAction::Created)
                    }
                };

                self.observer
                    .record_committed(batch_id, schema.entity, action, id);
                summaries.push(EntitySummary {
                    id,
                    entity: schema.entity,
                    action,
                    display: valid.record.display.clone(),
                });
            }
        }

        let last_row = records.last().map(|r| r.row).unwrap_or(first_row);
        tx.commit()
            .map_err(|e| fail(last_row, RepositoryError::from(e)))?;

        Ok(summaries)
    }

    /// 提交后派发事件（失败只上报观察者）
    fn dispatch_events(&self, summaries: &[EntitySummary], actor: &str, batch_id: &str) {
        for summary in summaries {
            let outcome = self.notifier.notify(
                summary.entity,
                summary.action,
                summary.id,
                &summary.display,
                actor,
                batch_id,
            );
            match outcome {
                NotifyOutcome::Dispatched(_) => {}
                NotifyOutcome::Unregistered(name) => {
                    self.observer
                        .event_not_dispatched(batch_id, &name, "unregistered")
                }
                NotifyOutcome::Failed { name, error } => {
                    self.observer.event_not_dispatched(batch_id, &name, &error)
                }
            }
        }
    }

    /// 批次审计（在事务之外写入；失败不影响导入结果）
    fn write_audit(&self, result: &ImportBatchResult, actor: &str, total_rows: usize, started: Instant) {
        let errors_json = if result.invalid_rows.is_empty() {
            None
        } else {
            serde_json::to_string(&result.invalid_rows).ok()
        };

        let log = ImportBatchLog {
            batch_id: result.batch_id.clone(),
            entity: result.entity.to_string(),
            actor: actor.to_string(),
            status: result.state.to_string(),
            total_rows: total_rows as i64,
            imported_rows: result.imported as i64,
            created_rows: result.created as i64,
            updated_rows: result.updated as i64,
            invalid_rows: result.invalid_rows.len() as i64,
            elapsed_ms: started.elapsed().as_millis() as i64,
            errors_json,
            imported_at: Utc::now().to_rfc3339(),
        };

        if let Err(e) = self.audit_repo.insert(&log) {
            self.observer.audit_failed(&result.batch_id, &e.to_string());
        }
    }
}
