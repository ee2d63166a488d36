// ==========================================
// 人力资源管理后台 - 导入引擎集成测试
// ==========================================
// 覆盖: 原子性 / 批内唯一 / 长度边界 / 规范化 / upsert /
//      提交阶段冲突回滚 / 事件派发 / 观察者 / 批次审计
// ==========================================

mod test_helpers;

use hr_import::config::ImportConfig;
use hr_import::domain::row::RawRow;
use hr_import::domain::types::{BatchState, ImportAction, ImportErrorType};
use hr_import::importer::{ImportEngine, ImportObserver};
use hr_import::repository::ImportBatchLogRepository;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use test_helpers::*;

fn proyecto(nombre: &str) -> RawRow {
    RawRow::new().with("nombre", nombre)
}

// ==========================================
// 基本场景
// ==========================================

#[test]
fn test_single_valid_project_is_imported() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (engine, conn, _observer) = create_engine(&db_path);

    let rows = vec![RawRow::new()
        .with("nombre", "Proyecto Alpha")
        .with("descripcion", "Q1 project")];
    let result = engine.import("proyectos", rows, "admin").unwrap();

    assert!(result.success, "{:?}", result.invalid_rows);
    assert_eq!(result.state, BatchState::Committed);
    assert_eq!(result.imported, 1);
    assert_eq!(result.created, 1);
    assert_eq!(result.updated, 0);
    assert!(result.invalid_rows.is_empty());
    assert_eq!(result.imported_data[0].display, "Proyecto Alpha");

    assert_eq!(count(&conn, "proyectos"), 1);
    let id = result.imported_data[0].id;
    assert_eq!(
        text_column(&conn, "proyectos", id, "descripcion").as_deref(),
        Some("Q1 project")
    );
    assert_eq!(
        text_column(&conn, "proyectos", id, "imported_by").as_deref(),
        Some("admin")
    );
    assert!(text_column(&conn, "proyectos", id, "created_at").is_some());
}

#[test]
fn test_unresolved_reference_rejects_batch() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (engine, conn, _observer) = create_engine(&db_path);

    let rows = vec![RawRow::new()
        .with("nombre", "Proyecto Alpha")
        .with("responsable_nombre", "Nombre Inexistente")];
    let result = engine.import("proyectos", rows, "admin").unwrap();

    assert!(!result.success);
    assert_eq!(result.state, BatchState::Rejected);
    assert_eq!(result.imported, 0);
    assert_eq!(result.invalid_rows.len(), 1);
    let invalid = &result.invalid_rows[0];
    assert_eq!(invalid.row, 1);
    assert_eq!(invalid.error_type, ImportErrorType::Processing);
    assert_eq!(invalid.errors.fields, vec!["responsable_nombre".to_string()]);
    assert!(invalid.errors.messages[0].contains("Nombre Inexistente"));

    assert_eq!(count(&conn, "proyectos"), 0);
}

#[test]
fn test_one_invalid_row_leaves_store_unchanged() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (engine, conn, _observer) = create_engine(&db_path);

    let rows = vec![
        proyecto("Proyecto Alpha"),
        RawRow::new().with("descripcion", "sin nombre"),
        proyecto("Proyecto Gamma"),
    ];
    let result = engine.import("proyectos", rows, "admin").unwrap();

    assert!(!result.success);
    assert_eq!(result.imported, 0);
    assert_eq!(result.valid_rows.len(), 2);
    assert_eq!(result.invalid_rows.len(), 1);
    assert_eq!(result.invalid_rows[0].row, 2);
    assert_eq!(result.invalid_rows[0].error_type, ImportErrorType::Validation);
    // 失败行回显原始输入
    assert_eq!(result.invalid_rows[0].data.raw("descripcion"), Some("sin nombre"));

    assert_eq!(count(&conn, "proyectos"), 0);
}

#[test]
fn test_duplicate_within_batch() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (engine, conn, _observer) = create_engine(&db_path);

    let rows = vec![proyecto("Proyecto Alpha"), proyecto("  Proyecto Alpha ")];
    let result = engine.import("proyectos", rows, "admin").unwrap();

    assert!(!result.success);
    assert_eq!(result.invalid_rows.len(), 1);
    let invalid = &result.invalid_rows[0];
    assert_eq!(invalid.row, 2);
    assert_eq!(invalid.error_type, ImportErrorType::Duplicate);
    assert!(invalid.errors.has_field("nombre"));
    assert!(invalid.errors.messages[0].contains("fila 1"));

    assert_eq!(count(&conn, "proyectos"), 0);
}

#[test]
fn test_duplicate_against_store() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (engine, conn, _observer) = create_engine(&db_path);

    assert!(engine
        .import("proyectos", vec![proyecto("Proyecto Alpha")], "admin")
        .unwrap()
        .success);

    let result = engine
        .import("proyectos", vec![proyecto("Proyecto Alpha")], "admin")
        .unwrap();
    assert!(!result.success);
    assert_eq!(result.invalid_rows[0].error_type, ImportErrorType::Duplicate);
    assert_eq!(
        result.invalid_rows[0].errors.messages[0],
        "Ya existe un registro con el mismo Nombre"
    );
    assert_eq!(count(&conn, "proyectos"), 1);
}

#[test]
fn test_max_length_boundary() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (engine, conn, _observer) = create_engine(&db_path);

    let result = engine
        .import("proyectos", vec![proyecto(&"a".repeat(256))], "admin")
        .unwrap();
    assert!(!result.success);
    assert_eq!(result.invalid_rows[0].error_type, ImportErrorType::Validation);
    assert_eq!(result.invalid_rows[0].errors.fields, vec!["nombre".to_string()]);
    assert!(result.invalid_rows[0].errors.messages[0].contains("255"));

    let result = engine
        .import("proyectos", vec![proyecto(&"a".repeat(255))], "admin")
        .unwrap();
    assert!(result.success);
    assert_eq!(count(&conn, "proyectos"), 1);
}

#[test]
fn test_label_column_used_when_name_column_blank() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (engine, conn, _observer) = create_engine(&db_path);

    let rows = vec![RawRow::new()
        .with("nombre", "")
        .with("Nombre", "Proyecto Alpha")];
    let result = engine.import("proyectos", rows, "admin").unwrap();

    assert!(result.success, "{:?}", result.invalid_rows);
    let id = result.imported_data[0].id;
    assert_eq!(
        text_column(&conn, "proyectos", id, "nombre").as_deref(),
        Some("Proyecto Alpha")
    );
}

#[test]
fn test_all_invalid_rows_are_reported_together() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (engine, _conn, observer) = create_engine(&db_path);

    let rows = vec![
        RawRow::new().with("descripcion", "sin nombre"),
        proyecto("Proyecto Alpha").with("estado", "Desconocido"),
        proyecto("Proyecto Beta")
            .with("fecha_inicio", "2024-05-01")
            .with("fecha_fin", "2024-04-01"),
    ];
    let result = engine.import("proyectos", rows, "admin").unwrap();

    let rows: Vec<usize> = result.invalid_rows.iter().map(|r| r.row).collect();
    assert_eq!(rows, vec![1, 2, 3]);
    assert_eq!(result.invalid_rows[1].error_type, ImportErrorType::Validation);
    assert!(result.invalid_rows[1].errors.has_field("estado"));
    assert_eq!(result.invalid_rows[2].error_type, ImportErrorType::Processing);
    assert!(result.invalid_rows[2].errors.has_field("fecha_fin"));
    assert_eq!(*observer.rejected_rows.lock().unwrap(), vec![1, 2, 3]);
}

#[test]
fn test_select_option_is_stored_canonically() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (engine, conn, _observer) = create_engine(&db_path);

    let result = engine
        .import(
            "proyectos",
            vec![proyecto("Proyecto Alpha").with("estado", "en CURSO")],
            "admin",
        )
        .unwrap();
    assert!(result.success);
    let id = result.imported_data[0].id;
    assert_eq!(
        text_column(&conn, "proyectos", id, "estado").as_deref(),
        Some("En curso")
    );
}

// ==========================================
// 规范化 / upsert
// ==========================================

#[test]
fn test_email_is_normalized_on_persist() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (engine, conn, _observer) = create_engine(&db_path);

    let rows = vec![RawRow::new()
        .with("Nombre", "Jane")
        .with("Primer apellido", "Doe")
        .with("NIF", "12345678z")
        .with("Email", "  Jane.Doe@Example.com ")];
    let result = engine.import("empleados", rows, "admin").unwrap();

    assert!(result.success, "{:?}", result.invalid_rows);
    let id = result.imported_data[0].id;
    assert_eq!(
        text_column(&conn, "empleados", id, "email").as_deref(),
        Some("jane.doe@example.com")
    );
    assert_eq!(
        text_column(&conn, "empleados", id, "nif").as_deref(),
        Some("12345678Z")
    );
}

#[test]
fn test_employee_address_creates_dependent_record() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (engine, conn, _observer) = create_engine(&db_path);

    let rows = vec![RawRow::new()
        .with("nombre", "Ana")
        .with("primer_apellido", "López")
        .with("nif", "87654321X")
        .with("email", "ana@example.com")
        .with("direccion", "Calle Mayor 1, 28001 Madrid")];
    let result = engine.import("empleados", rows, "admin").unwrap();

    assert!(result.success, "{:?}", result.invalid_rows);
    assert_eq!(count(&conn, "direcciones"), 1);

    let guard = conn.lock().unwrap();
    let (codigo_postal, linked): (Option<String>, i64) = guard
        .query_row(
            "SELECT d.codigo_postal, e.direccion_id FROM empleados e
             JOIN direcciones d ON d.id = e.direccion_id WHERE e.id = ?1",
            params![result.imported_data[0].id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(codigo_postal.as_deref(), Some("28001"));
    assert!(linked > 0);
}

fn empleado_con_direccion(direccion: &str) -> RawRow {
    RawRow::new()
        .with("nombre", "Ana")
        .with("primer_apellido", "López")
        .with("nif", "12345678Z")
        .with("email", "ana@example.com")
        .with("direccion", direccion)
}

fn orphan_addresses(conn: &Arc<Mutex<Connection>>) -> i64 {
    let guard = conn.lock().unwrap();
    guard
        .query_row(
            "SELECT COUNT(*) FROM direcciones d
             WHERE NOT EXISTS (SELECT 1 FROM empleados e WHERE e.direccion_id = d.id)
               AND NOT EXISTS (SELECT 1 FROM empresas c WHERE c.direccion_id = d.id)",
            [],
            |row| row.get(0),
        )
        .unwrap()
}

#[test]
fn test_reimport_rewrites_linked_address_in_place() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (engine, conn, _observer) = create_engine(&db_path);

    let first = engine
        .import("empleados", vec![empleado_con_direccion("Calle Mayor 1, 28001 Madrid")], "admin")
        .unwrap();
    assert!(first.success, "{:?}", first.invalid_rows);
    let id = first.imported_data[0].id;
    let guard = conn.lock().unwrap();
    let address_id: i64 = guard
        .query_row("SELECT direccion_id FROM empleados WHERE id = ?1", params![id], |r| r.get(0))
        .unwrap();
    drop(guard);

    for direccion in ["Calle Mayor 1, 28001 Madrid", "Gran Vía 10"] {
        let again = engine
            .import("empleados", vec![empleado_con_direccion(direccion)], "admin")
            .unwrap();
        assert!(again.success, "{:?}", again.invalid_rows);
        assert_eq!(again.imported_data[0].action, ImportAction::Updated);
        assert_eq!(again.imported_data[0].id, id);
    }

    assert_eq!(count(&conn, "direcciones"), 1);
    assert_eq!(orphan_addresses(&conn), 0);

    let guard = conn.lock().unwrap();
    let (linked, completa, codigo_postal): (i64, String, Option<String>) = guard
        .query_row(
            "SELECT e.direccion_id, d.direccion_completa, d.codigo_postal FROM empleados e
             JOIN direcciones d ON d.id = e.direccion_id WHERE e.id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(linked, address_id);
    assert_eq!(completa, "Gran Vía 10");
    assert_eq!(codigo_postal, None);
}

#[test]
fn test_upsert_by_natural_key_updates_existing() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (engine, conn, _observer) = create_engine(&db_path);
    let existing = seed_empleado(&conn, "Ana", "López", None, "12345678Z", "ana@example.com");

    let rows = vec![RawRow::new()
        .with("nombre", "Ana")
        .with("primer_apellido", "López")
        .with("segundo_apellido", "García")
        .with("nif", "12345678z")
        .with("email", "ana@example.com")
        .with("telefono", "600111222")];
    let result = engine.import("empleados", rows, "rrhh").unwrap();

    assert!(result.success, "{:?}", result.invalid_rows);
    assert_eq!(result.created, 0);
    assert_eq!(result.updated, 1);
    assert_eq!(result.imported_data[0].id, existing);
    assert_eq!(result.imported_data[0].action, ImportAction::Updated);

    assert_eq!(count(&conn, "empleados"), 1);
    assert_eq!(
        text_column(&conn, "empleados", existing, "telefono").as_deref(),
        Some("600111222")
    );
    assert_eq!(
        text_column(&conn, "empleados", existing, "imported_by").as_deref(),
        Some("rrhh")
    );
    // 创建时间保持不变
    assert_eq!(
        text_column(&conn, "empleados", existing, "created_at").as_deref(),
        Some("2024-01-01T00:00:00+00:00")
    );
}

#[test]
fn test_upsert_still_rejects_unique_clash_with_other_record() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (engine, conn, _observer) = create_engine(&db_path);
    seed_empleado(&conn, "Ana", "López", None, "12345678Z", "ana@example.com");
    seed_empleado(&conn, "Luis", "Pérez", None, "87654321X", "luis@example.com");

    // 按 NIF 更新 Ana，但邮箱与 Luis 冲突
    let rows = vec![RawRow::new()
        .with("nombre", "Ana")
        .with("primer_apellido", "López")
        .with("nif", "12345678Z")
        .with("email", "LUIS@example.com")];
    let result = engine.import("empleados", rows, "admin").unwrap();

    assert!(!result.success);
    assert_eq!(result.invalid_rows[0].error_type, ImportErrorType::Duplicate);
    assert_eq!(result.invalid_rows[0].errors.fields, vec!["email".to_string()]);
}

#[test]
fn test_same_reference_text_resolves_to_same_id() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (engine, conn, _observer) = create_engine(&db_path);
    let ana = seed_empleado(&conn, "Ana", "López", Some("García"), "12345678Z", "ana@example.com");

    let rows = vec![
        RawRow::new()
            .with("codigo", "C-001")
            .with("empleado", "Ana López")
            .with("tipo_contrato", "Indefinido")
            .with("fecha_inicio", "2024-01-01"),
        RawRow::new()
            .with("codigo", "C-002")
            .with("empleado", "ana lópez")
            .with("tipo_contrato", "indefinido")
            .with("fecha_inicio", "01/06/2024"),
    ];
    let result = engine.import("contratos", rows, "admin").unwrap();
    assert!(result.success, "{:?}", result.invalid_rows);

    let guard = conn.lock().unwrap();
    let ids: Vec<i64> = guard
        .prepare("SELECT empleado_id FROM contratos ORDER BY codigo")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(ids, vec![ana, ana]);
}

// ==========================================
// 提交阶段失败
// ==========================================

/// 在第一阶段结束后用第二个连接抢先写入同名项目
struct RacingObserver {
    db_path: String,
}

impl ImportObserver for RacingObserver {
    fn validation_finished(&self, _batch_id: &str, _valid: usize, _invalid: usize) {
        let conn = hr_import::db::open_sqlite_connection(&self.db_path).unwrap();
        conn.execute(
            "INSERT INTO proyectos (nombre, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params!["Proyecto Alpha", "2024-01-01T00:00:00+00:00"],
        )
        .unwrap();
    }
}

#[test]
fn test_conflict_after_validation_rolls_back() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let engine = ImportEngine::new(conn.clone(), ImportConfig::default())
        .unwrap()
        .with_dispatcher(dispatcher.clone())
        .with_observer(Arc::new(RacingObserver {
            db_path: db_path.clone(),
        }));

    let rows = vec![proyecto("Proyecto Beta"), proyecto("Proyecto Alpha")];
    let result = engine.import("proyectos", rows, "admin").unwrap();

    assert!(!result.success);
    assert_eq!(result.state, BatchState::RolledBack);
    assert_eq!(result.imported, 0);
    assert_eq!(result.valid_rows.len(), 1);
    assert_eq!(result.invalid_rows.len(), 1);

    let invalid = &result.invalid_rows[0];
    assert_eq!(invalid.row, 2);
    assert_eq!(invalid.error_type, ImportErrorType::DatabaseError);
    assert_eq!(invalid.errors.fields, vec!["nombre".to_string()]);
    assert_eq!(
        invalid.errors.messages,
        vec!["Ya existe un registro con el mismo Nombre".to_string()]
    );
    // 原始存储错误不外泄
    assert!(!invalid.errors.messages[0].contains("constraint"));

    // 只剩抢先写入的那一行；Proyecto Beta 已回滚
    assert_eq!(count(&conn, "proyectos"), 1);
    assert!(dispatcher.names().is_empty());
}

fn asignacion(puesto: &str) -> RawRow {
    RawRow::new()
        .with("empleado", "12345678Z")
        .with("departamento", "Ventas")
        .with("puesto", puesto)
        .with("fecha_inicio", "2024-01-01")
}

#[test]
fn test_repeated_assignment_is_duplicate_in_validation() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (engine, conn, observer) = create_engine(&db_path);
    let empresa = seed_empresa(&conn, "Acme", "B12345678");
    seed_departamento(&conn, "Ventas", empresa);
    seed_empleado(&conn, "Ana", "López", None, "12345678Z", "ana@example.com");

    // 第二行以姓名引用同一员工，解析后组合键相同
    let rows = vec![
        asignacion("Comercial"),
        asignacion("Jefa de ventas").with("empleado", "Ana López"),
        asignacion("Comercial").with("puesto", ""),
    ];
    let result = engine.import("asignaciones", rows, "admin").unwrap();

    assert_eq!(result.state, BatchState::Rejected);
    assert_eq!(result.invalid_rows.len(), 2);

    let duplicate = &result.invalid_rows[0];
    assert_eq!(duplicate.row, 2);
    assert_eq!(duplicate.error_type, ImportErrorType::Duplicate);
    assert_eq!(
        duplicate.errors.fields,
        vec!["empleado".to_string(), "departamento".to_string(), "fecha_inicio".to_string()]
    );
    assert!(duplicate.errors.messages[0].contains("fila 1"));

    assert_eq!(result.invalid_rows[1].row, 3);
    assert_eq!(result.invalid_rows[1].error_type, ImportErrorType::Validation);

    assert_eq!(count(&conn, "asignaciones"), 0);
    assert!(!observer.calls().contains(&"batch_rolled_back".to_string()));
}

#[test]
fn test_assignment_already_stored_is_duplicate() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (engine, conn, _observer) = create_engine(&db_path);
    let empresa = seed_empresa(&conn, "Acme", "B12345678");
    seed_departamento(&conn, "Ventas", empresa);
    seed_empleado(&conn, "Ana", "López", None, "12345678Z", "ana@example.com");

    let first = engine
        .import("asignaciones", vec![asignacion("Comercial")], "admin")
        .unwrap();
    assert!(first.success, "{:?}", first.invalid_rows);

    let again = engine
        .import("asignaciones", vec![asignacion("Comercial")], "admin")
        .unwrap();
    assert_eq!(again.state, BatchState::Rejected);
    assert_eq!(again.invalid_rows[0].error_type, ImportErrorType::Duplicate);
    assert!(again.invalid_rows[0].errors.has_field("departamento"));
    assert_eq!(count(&conn, "asignaciones"), 1);

    // 开始日期不同则不构成重复
    let later = engine
        .import(
            "asignaciones",
            vec![asignacion("Comercial").with("fecha_inicio", "2025-01-01")],
            "admin",
        )
        .unwrap();
    assert!(later.success, "{:?}", later.invalid_rows);
}

// ==========================================
// 事件 / 观察者 / 审计
// ==========================================

#[test]
fn test_events_dispatched_after_commit() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    seed_empleado(&conn, "Ana", "López", None, "12345678Z", "ana@example.com");
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let engine = ImportEngine::new(conn.clone(), ImportConfig::default())
        .unwrap()
        .with_dispatcher(dispatcher.clone());

    let rows = vec![
        RawRow::new()
            .with("nombre", "Ana")
            .with("primer_apellido", "López")
            .with("nif", "12345678Z")
            .with("email", "ana@example.com"),
        RawRow::new()
            .with("nombre", "Luis")
            .with("primer_apellido", "Pérez")
            .with("nif", "87654321X")
            .with("email", "luis@example.com"),
    ];
    let result = engine.import("empleados", rows, "rrhh").unwrap();
    assert!(result.success, "{:?}", result.invalid_rows);

    assert_eq!(
        dispatcher.names(),
        vec![
            "App\\Events\\Empleado\\EmpleadoUpdated".to_string(),
            "App\\Events\\Empleado\\EmpleadoCreated".to_string(),
        ]
    );
    let events = dispatcher.events.lock().unwrap();
    assert!(events.iter().all(|e| e.actor == "rrhh" && e.batch_id == result.batch_id));
    assert_eq!(events[1].display, "Luis Pérez");
}

#[test]
fn test_no_events_for_rejected_batch() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let engine = ImportEngine::new(conn, ImportConfig::default())
        .unwrap()
        .with_dispatcher(dispatcher.clone());

    let rows = vec![proyecto("Proyecto Alpha"), RawRow::new()];
    let result = engine.import("proyectos", rows, "admin").unwrap();
    assert!(!result.success);
    assert!(dispatcher.names().is_empty());
}

#[test]
fn test_observer_lifecycle_order() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (engine, _conn, observer) = create_engine(&db_path);

    engine
        .import("proyectos", vec![proyecto("Proyecto Alpha")], "admin")
        .unwrap();
    assert_eq!(
        observer.calls(),
        vec![
            "batch_started",
            "validation_finished",
            "record_committed",
            "batch_committed"
        ]
    );
}

#[test]
fn test_batch_audit_is_recorded() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (engine, conn, _observer) = create_engine(&db_path);

    let ok = engine
        .import("proyectos", vec![proyecto("Proyecto Alpha")], "admin")
        .unwrap();
    let rejected = engine
        .import("proyectos", vec![proyecto("Proyecto Alpha")], "admin")
        .unwrap();

    let logs = ImportBatchLogRepository::new(conn).list_recent(10).unwrap();
    assert_eq!(logs.len(), 2);

    let ok_log = logs.iter().find(|l| l.batch_id == ok.batch_id).unwrap();
    assert_eq!(ok_log.status, "COMMITTED");
    assert_eq!(ok_log.entity, "proyectos");
    assert_eq!(ok_log.imported_rows, 1);
    assert!(ok_log.errors_json.is_none());

    let rejected_log = logs.iter().find(|l| l.batch_id == rejected.batch_id).unwrap();
    assert_eq!(rejected_log.status, "REJECTED");
    assert_eq!(rejected_log.invalid_rows, 1);
    assert!(rejected_log
        .errors_json
        .as_deref()
        .unwrap()
        .contains("duplicate"));
}

#[test]
fn test_english_locale_messages() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let config = ImportConfig {
        locale: "en".to_string(),
        ..ImportConfig::default()
    };
    let engine = ImportEngine::new(conn, config).unwrap();

    let result = engine.import("proyectos", vec![RawRow::new()], "admin").unwrap();
    assert!(!result.success);
    assert!(result.invalid_rows[0].errors.messages[0].contains("required"));
}
