// ==========================================
// 人力资源管理后台 - 记录处理器
// ==========================================
// 职责: 将通过校验的原始行转换为可落库载荷
// 说明: 通用的规范化 / 依赖实体准备 / 自然键提取在本模块完成；
//      每个实体只实现 RecordProcessor（Schema、引用解析、业务规则）
// ==========================================

mod asignaciones;
mod contratos;
mod departamentos;
mod empleados;
mod empresas;
mod proyectos;
mod usuarios;

pub use asignaciones::AsignacionProcessor;
pub use contratos::ContratoProcessor;
pub use departamentos::DepartamentoProcessor;
pub use empleados::EmpleadoProcessor;
pub use empresas::EmpresaProcessor;
pub use proyectos::ProyectoProcessor;
pub use usuarios::UsuarioProcessor;

use crate::domain::row::{DependentRecord, FieldValue, NaturalKey, ProcessedRecord, RawRow};
use crate::domain::schema::{FieldSpec, ImportSchema, SchemaError};
use crate::domain::types::{EntityKind, FieldStorage, FieldType};
use crate::i18n::Messages;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::duplicate_detector::normalized_unique_value;
use crate::importer::entity_resolver::{EntityResolver, ResolveError, ResolveResult};
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::import_repo::RecordStore;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// 依赖实体（地址）表
pub const ADDRESS_TABLE: &str = "direcciones";

// ==========================================
// ProcessingContext - 单行处理上下文
// ==========================================
pub struct ProcessingContext<'a, 'c> {
    pub store: RecordStore<'c>,
    pub resolver: &'a mut EntityResolver,
    pub messages: &'a Messages,
    /// 业务规则使用的“今天”（由引擎注入）
    pub today: NaiveDate,
}

// ==========================================
// RecordProcessor Trait
// ==========================================
// 实现者: 每个可导入实体一个
pub trait RecordProcessor: Send + Sync {
    fn entity(&self) -> EntityKind;

    fn schema(&self) -> &ImportSchema;

    /// 模板示例行（与 Schema 字段顺序一致）
    fn example_rows(&self) -> Vec<Vec<String>>;

    /// 自然键字段名（存在时按该字段 upsert）
    fn upsert_key(&self) -> Option<&'static str> {
        None
    }

    /// 组合唯一字段（按解析后的列值判重；为空表示无）
    fn composite_unique(&self) -> &'static [&'static str] {
        &[]
    }

    /// 解析外部引用；仓储异常以 Err 返回，解析失败写入 record.errors
    fn resolve_references(
        &self,
        _ctx: &mut ProcessingContext<'_, '_>,
        _row: &RawRow,
        _record: &mut ProcessedRecord,
    ) -> ImportResult<()> {
        Ok(())
    }

    /// 实体专属业务规则
    fn apply_business_rules(&self, _ctx: &ProcessingContext<'_, '_>, _record: &mut ProcessedRecord) {}

    /// 展示名称
    fn display_name(&self, record: &ProcessedRecord) -> String;
}

/// 行的自然键（规范化后）
pub fn natural_key_of(processor: &dyn RecordProcessor, row: &RawRow) -> Option<NaturalKey> {
    let field = processor.schema().field(processor.upsert_key()?)?;
    let raw = row.value_of(field)?;
    Some(NaturalKey {
        column: field.column_name().to_string(),
        value: normalized_unique_value(field, raw),
    })
}

/// 处理一行: 规范化 → 依赖实体 → 自然键 → 引用解析 → 业务规则
pub fn process_record(
    processor: &dyn RecordProcessor,
    ctx: &mut ProcessingContext<'_, '_>,
    row: &RawRow,
) -> ImportResult<ProcessedRecord> {
    let cleaner = DataCleaner;
    let mut record = ProcessedRecord::new();

    for field in &processor.schema().fields {
        let raw = match row.value_of(field) {
            Some(v) => v,
            None => continue,
        };

        match field.storage {
            FieldStorage::Column => {
                if let Some(value) = normalize_value(&cleaner, field, raw) {
                    record.set(field.column_name(), value);
                }
            }
            FieldStorage::Dependent => {
                record.dependents.push(address_dependent(&cleaner, field, raw));
            }
            FieldStorage::Reference => {}
        }
    }

    record.natural_key = natural_key_of(processor, row);

    processor.resolve_references(ctx, row, &mut record)?;
    processor.apply_business_rules(ctx, &mut record);
    record.display = processor.display_name(&record);

    Ok(record)
}

/// 按字段类型规范化单个值
pub fn normalize_value(cleaner: &DataCleaner, field: &FieldSpec, raw: &str) -> Option<FieldValue> {
    match field.field_type {
        FieldType::Email => Some(FieldValue::Text(cleaner.clean_email(raw))),
        FieldType::Date => cleaner.parse_date(raw).map(FieldValue::Date),
        FieldType::Boolean => cleaner.parse_boolean(raw).map(FieldValue::Bool),
        FieldType::Select => field
            .match_option(raw)
            .map(|opt| FieldValue::Text(opt.to_string())),
        FieldType::String | FieldType::Text => {
            if field.uppercase {
                Some(FieldValue::Text(cleaner.clean_tax_id(raw)))
            } else {
                Some(FieldValue::Text(cleaner.clean_text(raw, false)))
            }
        }
    }
}

fn address_dependent(cleaner: &DataCleaner, field: &FieldSpec, raw: &str) -> DependentRecord {
    let parsed = cleaner.parse_address(raw);
    let mut data = BTreeMap::new();
    data.insert(
        "direccion_completa".to_string(),
        FieldValue::Text(parsed.direccion_completa),
    );
    data.insert("calle".to_string(), FieldValue::Text(parsed.calle));
    // 缺失部分显式置空，原地更新旧地址时不残留旧值
    data.insert(
        "codigo_postal".to_string(),
        parsed.codigo_postal.map_or(FieldValue::Null, FieldValue::Text),
    );
    data.insert(
        "ciudad".to_string(),
        parsed.ciudad.map_or(FieldValue::Null, FieldValue::Text),
    );

    DependentRecord {
        table: ADDRESS_TABLE,
        field: field.name.clone(),
        column: field.column_name().to_string(),
        data,
    }
}

// ==========================================
// 处理器共用的辅助函数
// ==========================================

/// Schema 字段（处理器自身的 Schema 中必然存在）
pub(crate) fn schema_field<'s>(schema: &'s ImportSchema, name: &str) -> ImportResult<&'s FieldSpec> {
    schema.field(name).ok_or_else(|| {
        ImportError::InternalError(format!("字段未定义: {}.{}", schema.entity, name))
    })
}

/// 写入引用解析结果: 成功写外键列，失败记为该 Schema 字段的错误
pub(crate) fn apply_reference(
    messages: &Messages,
    record: &mut ProcessedRecord,
    field: &FieldSpec,
    result: ResolveResult,
) -> ImportResult<()> {
    match result {
        Ok(id) => record.set(field.column_name(), FieldValue::Integer(id)),
        Err(ResolveError::Repository(e)) => return Err(e.into()),
        Err(e) => record
            .errors
            .add(&field.name, e.user_message(messages, &field.label)),
    }
    Ok(())
}

/// 结束日期必须晚于开始日期
pub(crate) fn check_date_order(
    messages: &Messages,
    schema: &ImportSchema,
    record: &mut ProcessedRecord,
    start: &str,
    end: &str,
) {
    let (Some(start_field), Some(end_field)) = (schema.field(start), schema.field(end)) else {
        return;
    };
    let start_date = record.get(start_field.column_name()).and_then(FieldValue::as_date);
    let end_date = record.get(end_field.column_name()).and_then(FieldValue::as_date);

    if let (Some(s), Some(e)) = (start_date, end_date) {
        if e <= s {
            record.errors.add(
                &end_field.name,
                messages.text_with(
                    "rules.end_before_start",
                    &[("end", &end_field.label), ("start", &start_field.label)],
                ),
            );
        }
    }
}

/// 日期不能晚于今天
pub(crate) fn check_not_future(
    messages: &Messages,
    schema: &ImportSchema,
    record: &mut ProcessedRecord,
    field_name: &str,
    today: NaiveDate,
) {
    let Some(field) = schema.field(field_name) else {
        return;
    };
    if let Some(date) = record.get(field.column_name()).and_then(FieldValue::as_date) {
        if date > today {
            record.errors.add(
                &field.name,
                messages.text_with("rules.future_date", &[("label", &field.label)]),
            );
        }
    }
}

// ==========================================
// ProcessorRegistry - 实体 -> 处理器
// ==========================================
pub struct ProcessorRegistry {
    processors: Vec<Box<dyn RecordProcessor>>,
}

impl ProcessorRegistry {
    /// 注册全部实体并校验各自 Schema 不变量
    pub fn new() -> ImportResult<Self> {
        let processors: Vec<Box<dyn RecordProcessor>> = vec![
            Box::new(EmpleadoProcessor::new()),
            Box::new(EmpresaProcessor::new()),
            Box::new(DepartamentoProcessor::new()),
            Box::new(ContratoProcessor::new()),
            Box::new(AsignacionProcessor::new()),
            Box::new(UsuarioProcessor::new()),
            Box::new(ProyectoProcessor::new()),
        ];

        for processor in &processors {
            let schema = processor.schema();
            schema.check_invariants()?;
            if let Some(field) = processor
                .composite_unique()
                .iter()
                .find(|name| schema.field(name).is_none())
            {
                return Err(SchemaError::UnknownCompositeField {
                    entity: schema.entity.to_string(),
                    field: field.to_string(),
                }
                .into());
            }
        }

        Ok(Self { processors })
    }

    pub fn get(&self, entity: EntityKind) -> ImportResult<&dyn RecordProcessor> {
        self.processors
            .iter()
            .find(|p| p.entity() == entity)
            .map(|p| p.as_ref())
            .ok_or_else(|| ImportError::UnknownEntity(entity.to_string()))
    }

    pub fn entities(&self) -> Vec<EntityKind> {
        self.processors.iter().map(|p| p.entity()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn test_registry_covers_all_entities() {
        let registry = ProcessorRegistry::new().unwrap();
        for entity in EntityKind::ALL {
            let processor = registry.get(entity).unwrap();
            assert_eq!(processor.entity(), entity);

            let examples = processor.example_rows();
            assert!(!examples.is_empty());
            for example in examples {
                assert_eq!(example.len(), processor.schema().fields.len(), "{}", entity);
            }
        }
    }

    #[test]
    fn test_upsert_keys_are_unique_fields() {
        let registry = ProcessorRegistry::new().unwrap();
        for entity in EntityKind::ALL {
            let processor = registry.get(entity).unwrap();
            if let Some(key) = processor.upsert_key() {
                let field = processor.schema().field(key).unwrap();
                assert!(field.unique, "{}.{}", entity, key);
            }
        }
    }

    #[test]
    fn test_process_record_normalizes_and_prepares_dependents() {
        let conn = open_in_memory().unwrap();
        let messages = Messages::default();
        let mut resolver = EntityResolver::default();
        let mut ctx = ProcessingContext {
            store: RecordStore::new(&conn),
            resolver: &mut resolver,
            messages: &messages,
            today: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        let processor = EmpleadoProcessor::new();
        let row = RawRow::new()
            .with("Nombre", " Ana ")
            .with("Primer apellido", "López")
            .with("NIF", " 12345678z ")
            .with("Email", "  Ana.Lopez@Example.com ")
            .with("Fecha de nacimiento", "15/03/1990")
            .with("Dirección", "Calle Mayor 1, 28001 Madrid");

        let record = process_record(&processor, &mut ctx, &row).unwrap();
        assert!(record.is_ready(), "{:?}", record.errors);
        assert_eq!(record.get("nombre"), Some(&FieldValue::text("Ana")));
        assert_eq!(record.get("nif"), Some(&FieldValue::text("12345678Z")));
        assert_eq!(record.get("email"), Some(&FieldValue::text("ana.lopez@example.com")));
        assert_eq!(
            record.get("fecha_nacimiento"),
            Some(&FieldValue::Date(NaiveDate::from_ymd_opt(1990, 3, 15).unwrap()))
        );
        assert!(record.get("segundo_apellido").is_none());
        assert_eq!(record.dependents.len(), 1);
        assert_eq!(record.dependents[0].column, "direccion_id");
        assert_eq!(
            record.natural_key,
            Some(NaturalKey {
                column: "nif".to_string(),
                value: "12345678Z".to_string()
            })
        );
        assert_eq!(record.display, "Ana López");
    }
}
