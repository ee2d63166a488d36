// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、种子数据、记录型观察者/派发器
// ==========================================
#![allow(dead_code)]

use hr_import::config::ImportConfig;
use hr_import::db::{open_sqlite_connection, run_migrations};
use hr_import::domain::import_result::InvalidRow;
use hr_import::domain::types::{EntityKind, ImportAction};
use hr_import::events::{DomainEvent, EventDispatcher};
use hr_import::importer::{ImportEngine, ImportObserver};
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    run_migrations(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接
pub fn open_shared(db_path: &str) -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(open_sqlite_connection(db_path).expect("打开数据库失败")))
}

/// 创建带记录型观察者的引擎
pub fn create_engine(db_path: &str) -> (ImportEngine, Arc<Mutex<Connection>>, Arc<RecordingObserver>) {
    let conn = open_shared(db_path);
    let observer = Arc::new(RecordingObserver::default());
    let engine = ImportEngine::new(conn.clone(), ImportConfig::default())
        .expect("创建引擎失败")
        .with_observer(observer.clone());
    (engine, conn, observer)
}

/// 表行数
pub fn count(conn: &Arc<Mutex<Connection>>, table: &str) -> i64 {
    let conn = conn.lock().expect("锁获取失败");
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .expect("COUNT 查询失败")
}

// ==========================================
// 种子数据
// ==========================================

const NOW: &str = "2024-01-01T00:00:00+00:00";

pub fn seed_empresa(conn: &Arc<Mutex<Connection>>, nombre: &str, cif: &str) -> i64 {
    let conn = conn.lock().expect("锁获取失败");
    conn.execute(
        "INSERT INTO empresas (nombre, cif, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        params![nombre, cif, NOW],
    )
    .expect("插入 empresa 失败");
    conn.last_insert_rowid()
}

pub fn seed_empleado(
    conn: &Arc<Mutex<Connection>>,
    nombre: &str,
    primer_apellido: &str,
    segundo_apellido: Option<&str>,
    nif: &str,
    email: &str,
) -> i64 {
    let conn = conn.lock().expect("锁获取失败");
    conn.execute(
        "INSERT INTO empleados (nombre, primer_apellido, segundo_apellido, nif, email, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![nombre, primer_apellido, segundo_apellido, nif, email, NOW],
    )
    .expect("插入 empleado 失败");
    conn.last_insert_rowid()
}

pub fn seed_departamento(conn: &Arc<Mutex<Connection>>, nombre: &str, empresa_id: i64) -> i64 {
    let conn = conn.lock().expect("锁获取失败");
    conn.execute(
        "INSERT INTO departamentos (nombre, empresa_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        params![nombre, empresa_id, NOW],
    )
    .expect("插入 departamento 失败");
    conn.last_insert_rowid()
}

/// 读取单个文本列
pub fn text_column(conn: &Arc<Mutex<Connection>>, table: &str, id: i64, column: &str) -> Option<String> {
    let conn = conn.lock().expect("锁获取失败");
    conn.query_row(
        &format!("SELECT {} FROM {} WHERE id = ?1", column, table),
        params![id],
        |row| row.get::<_, Option<String>>(0),
    )
    .expect("查询失败")
}

// ==========================================
// RecordingObserver - 记录观察者回调
// ==========================================
#[derive(Default)]
pub struct RecordingObserver {
    pub calls: Mutex<Vec<String>>,
    pub rejected_rows: Mutex<Vec<usize>>,
    pub undispatched: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("锁获取失败").clone()
    }

    fn push(&self, call: &str) {
        self.calls.lock().expect("锁获取失败").push(call.to_string());
    }
}

impl ImportObserver for RecordingObserver {
    fn batch_started(&self, _batch_id: &str, _entity: EntityKind, _rows: usize, _actor: &str) {
        self.push("batch_started");
    }

    fn row_rejected(&self, _batch_id: &str, invalid: &InvalidRow) {
        self.rejected_rows.lock().expect("锁获取失败").push(invalid.row);
        self.push("row_rejected");
    }

    fn validation_finished(&self, _batch_id: &str, _valid: usize, _invalid: usize) {
        self.push("validation_finished");
    }

    fn record_committed(&self, _batch_id: &str, _entity: EntityKind, _action: ImportAction, _id: i64) {
        self.push("record_committed");
    }

    fn batch_committed(&self, _batch_id: &str, _created: usize, _updated: usize, _elapsed_ms: u128) {
        self.push("batch_committed");
    }

    fn batch_rejected(&self, _batch_id: &str, _invalid: usize) {
        self.push("batch_rejected");
    }

    fn batch_rolled_back(&self, _batch_id: &str, _row: usize, _cause: &str) {
        self.push("batch_rolled_back");
    }

    fn event_not_dispatched(&self, _batch_id: &str, event: &str, _reason: &str) {
        self.undispatched
            .lock()
            .expect("锁获取失败")
            .push(event.to_string());
    }

    fn audit_failed(&self, _batch_id: &str, _error: &str) {
        self.push("audit_failed");
    }
}

// ==========================================
// RecordingDispatcher - 记录派发的事件
// ==========================================
#[derive(Default)]
pub struct RecordingDispatcher {
    pub events: Mutex<Vec<DomainEvent>>,
}

impl RecordingDispatcher {
    pub fn names(&self) -> Vec<String> {
        self.events
            .lock()
            .expect("锁获取失败")
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }
}

impl EventDispatcher for RecordingDispatcher {
    fn dispatch(&self, event: &DomainEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.events.lock().expect("锁获取失败").push(event.clone());
        Ok(())
    }
}
