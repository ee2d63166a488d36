// ==========================================
// 人力资源管理后台 - SQLite 连接初始化与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 集中维护导入引擎依赖的表结构（含真实的 UNIQUE / NOT NULL 约束）
// ==========================================

use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Unicode 小写 SQL 函数名（内置 LOWER 只折叠 ASCII，Á/Ó/Ñ 等原样保留）
pub const UNICODE_LOWER_FN: &str = "unicode_lower";

/// 配置 SQLite 连接的统一 PRAGMA 与自定义函数
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
/// - unicode_lower 需要“每个连接”单独注册
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    register_unicode_lower(conn)?;
    Ok(())
}

/// 注册 unicode_lower(x): 文本按 Unicode 规则转小写，NULL 保持 NULL
fn register_unicode_lower(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        UNICODE_LOWER_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let lowered = match ctx.get_raw(0) {
                ValueRef::Null | ValueRef::Blob(_) => None,
                ValueRef::Integer(i) => Some(i.to_string()),
                ValueRef::Real(f) => Some(f.to_string()),
                ValueRef::Text(t) => Some(String::from_utf8_lossy(t).to_lowercase()),
            };
            Ok(lowered)
        },
    )
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开内存数据库并建表（单元测试 / 演示用）
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 建表（幂等）
///
/// 唯一约束与导入 Schema 中 `unique=true` 的字段一一对应；
/// 提交阶段若并发导入抢占了同一唯一值，由存储层约束兜底拒绝。
pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS direcciones (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            direccion_completa TEXT NOT NULL,
            calle TEXT,
            codigo_postal TEXT,
            ciudad TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS empresas (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre TEXT NOT NULL UNIQUE,
            cif TEXT NOT NULL UNIQUE,
            email TEXT,
            telefono TEXT,
            direccion_id INTEGER REFERENCES direcciones(id),
            representante_id INTEGER REFERENCES empleados(id),
            imported_by TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS empleados (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre TEXT NOT NULL,
            primer_apellido TEXT NOT NULL,
            segundo_apellido TEXT,
            nif TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            telefono TEXT,
            numero_seguridad_social TEXT UNIQUE,
            fecha_nacimiento TEXT,
            genero TEXT,
            empresa_id INTEGER REFERENCES empresas(id),
            direccion_id INTEGER REFERENCES direcciones(id),
            imported_by TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_empleados_nombre
            ON empleados(nombre, primer_apellido);

        CREATE TABLE IF NOT EXISTS departamentos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre TEXT NOT NULL UNIQUE,
            descripcion TEXT,
            empresa_id INTEGER NOT NULL REFERENCES empresas(id),
            responsable_id INTEGER REFERENCES empleados(id),
            imported_by TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS contratos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            codigo TEXT NOT NULL UNIQUE,
            empleado_id INTEGER NOT NULL REFERENCES empleados(id),
            tipo_contrato TEXT NOT NULL,
            fecha_inicio TEXT NOT NULL,
            fecha_fin TEXT,
            jornada_completa INTEGER NOT NULL DEFAULT 1,
            horas_semanales INTEGER,
            imported_by TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS asignaciones (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            empleado_id INTEGER NOT NULL REFERENCES empleados(id),
            departamento_id INTEGER NOT NULL REFERENCES departamentos(id),
            puesto TEXT NOT NULL,
            fecha_inicio TEXT NOT NULL,
            fecha_fin TEXT,
            es_principal INTEGER NOT NULL DEFAULT 0,
            imported_by TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (empleado_id, departamento_id, fecha_inicio)
        );

        CREATE TABLE IF NOT EXISTS usuarios (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            rol TEXT NOT NULL,
            activo INTEGER NOT NULL DEFAULT 1,
            empleado_id INTEGER REFERENCES empleados(id),
            imported_by TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS proyectos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre TEXT NOT NULL UNIQUE,
            descripcion TEXT,
            responsable_id INTEGER REFERENCES empleados(id),
            fecha_inicio TEXT,
            fecha_fin TEXT,
            estado TEXT,
            imported_by TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS import_batch (
            batch_id TEXT PRIMARY KEY,
            entity TEXT NOT NULL,
            actor TEXT NOT NULL,
            status TEXT NOT NULL,
            total_rows INTEGER NOT NULL,
            imported_rows INTEGER NOT NULL,
            created_rows INTEGER NOT NULL,
            updated_rows INTEGER NOT NULL,
            invalid_rows INTEGER NOT NULL,
            elapsed_ms INTEGER NOT NULL,
            errors_json TEXT,
            imported_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_import_batch_imported_at
            ON import_batch(imported_at DESC);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}
