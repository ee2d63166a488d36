// ==========================================
// 人力资源管理后台 - 查重器
// ==========================================
// 职责: 唯一字段查重（已落库数据 + 同批次内已占用的值）
//      组合唯一查重（引用解析后的列值组合）
// 约束: 比较规范化后的值（TRIM；邮箱小写；税号大写）
// ==========================================

use crate::domain::row::{FieldValue, ProcessedRecord, RawRow, ValidationResult};
use crate::domain::schema::{FieldSpec, ImportSchema};
use crate::domain::types::FieldType;
use crate::i18n::Messages;
use crate::importer::data_cleaner::DataCleaner;
use crate::repository::error::RepositoryResult;
use crate::repository::import_repo::RecordStore;
use std::collections::HashMap;

// ==========================================
// BatchClaims - 同批次已占用的唯一值
// ==========================================
#[derive(Debug, Default)]
pub struct BatchClaims {
    // (字段名, 规范化值) -> 首次占用的行号
    claims: HashMap<(String, String), usize>,
}

impl BatchClaims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claimed_by(&self, field: &str, value: &str) -> Option<usize> {
        self.claims
            .get(&(field.to_string(), value.to_string()))
            .copied()
    }

    /// 占用一个值（已被占用时保留首个行号）
    pub fn claim(&mut self, field: &str, value: String, row: usize) {
        self.claims.entry((field.to_string(), value)).or_insert(row);
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

/// 唯一字段的规范化值
pub fn normalized_unique_value(field: &FieldSpec, raw: &str) -> String {
    let cleaner = DataCleaner;
    if field.field_type == FieldType::Email {
        cleaner.clean_email(raw)
    } else if field.uppercase {
        cleaner.clean_tax_id(raw)
    } else {
        cleaner.clean_text(raw, false)
    }
}

// ==========================================
// CompositeKey - 组合唯一键
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeKey {
    fields: Vec<String>,
    labels: Vec<String>,
    columns: Vec<(String, FieldValue)>,
}

impl CompositeKey {
    /// 由处理后的记录构造；任一字段缺值时返回 None（交由存储层约束）
    pub fn from_record(schema: &ImportSchema, fields: &[&str], record: &ProcessedRecord) -> Option<Self> {
        if fields.is_empty() {
            return None;
        }

        let mut key = CompositeKey {
            fields: Vec::with_capacity(fields.len()),
            labels: Vec::with_capacity(fields.len()),
            columns: Vec::with_capacity(fields.len()),
        };
        for name in fields {
            let field = schema.field(name)?;
            let value = record.get(field.column_name())?;
            if *value == FieldValue::Null {
                return None;
            }
            key.fields.push(field.name.clone());
            key.labels.push(field.label.clone());
            key.columns.push((field.column_name().to_string(), value.clone()));
        }
        Some(key)
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// BatchClaims 中的占用名（字段名以 + 连接）
    fn claim_name(&self) -> String {
        self.fields.join("+")
    }

    fn claim_value(&self) -> String {
        self.columns
            .iter()
            .map(|(_, v)| v.to_string())
            .collect::<Vec<_>>()
            .join("\u{1f}")
    }
}

pub struct DuplicateDetector<'m> {
    messages: &'m Messages,
}

impl<'m> DuplicateDetector<'m> {
    pub fn new(messages: &'m Messages) -> Self {
        Self { messages }
    }

    /// 检查一行的全部唯一字段
    ///
    /// # 参数
    /// - exclude_id: 按自然键匹配到的已有记录（upsert 更新时排除自身）
    pub fn check(
        &self,
        store: &RecordStore<'_>,
        schema: &ImportSchema,
        row: &RawRow,
        exclude_id: Option<i64>,
        claims: &BatchClaims,
    ) -> RepositoryResult<ValidationResult> {
        let mut result = ValidationResult::new();
        let table = schema.entity.table();

        for field in schema.unique_fields() {
            let raw = match row.value_of(field) {
                Some(v) => v,
                None => continue,
            };
            let value = normalized_unique_value(field, raw);
            let label = field.label.as_str();

            if let Some(first_row) = claims.claimed_by(&field.name, &value) {
                result.add(
                    &field.name,
                    self.messages.text_with(
                        "duplicate.in_batch",
                        &[("label", label), ("row", &first_row.to_string())],
                    ),
                );
                continue;
            }

            if store.exists_by(table, field.column_name(), &value, exclude_id)? {
                result.add(
                    &field.name,
                    self.messages
                        .text_with("duplicate.exists", &[("label", label)]),
                );
            }
        }

        Ok(result)
    }

    /// 检查组合唯一键（同批次占用 + 已落库数据）
    pub fn check_composite(
        &self,
        store: &RecordStore<'_>,
        schema: &ImportSchema,
        key: &CompositeKey,
        claims: &BatchClaims,
    ) -> RepositoryResult<ValidationResult> {
        let mut result = ValidationResult::new();
        let labels = key.labels.join(", ");

        if let Some(first_row) = claims.claimed_by(&key.claim_name(), &key.claim_value()) {
            result.add_for_fields(
                &key.fields,
                self.messages.text_with(
                    "duplicate.combination_in_batch",
                    &[("labels", &labels), ("row", &first_row.to_string())],
                ),
            );
        } else if store.exists_by_columns(schema.entity.table(), &key.columns)? {
            result.add_for_fields(
                &key.fields,
                self.messages
                    .text_with("duplicate.combination_exists", &[("labels", &labels)]),
            );
        }

        Ok(result)
    }

    /// 登记组合唯一键
    pub fn claim_composite(&self, key: &CompositeKey, row_number: usize, claims: &mut BatchClaims) {
        claims.claim(&key.claim_name(), key.claim_value(), row_number);
    }

    /// 登记一行的唯一值（该行通过查重后调用）
    pub fn claim_row(&self, schema: &ImportSchema, row: &RawRow, row_number: usize, claims: &mut BatchClaims) {
        for field in schema.unique_fields() {
            if let Some(raw) = row.value_of(field) {
                claims.claim(&field.name, normalized_unique_value(field, raw), row_number);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::domain::row::FieldValue;
    use crate::domain::types::EntityKind;
    use std::collections::BTreeMap;

    fn schema() -> ImportSchema {
        ImportSchema::new(
            EntityKind::Proyecto,
            vec![
                FieldSpec::string("nombre", "Nombre").required().unique(),
                FieldSpec::text("descripcion", "Descripción"),
            ],
        )
    }

    fn seed_project(store: &RecordStore, nombre: &str) -> i64 {
        let mut data = BTreeMap::new();
        data.insert("nombre".to_string(), FieldValue::text(nombre));
        data.insert("created_at".to_string(), FieldValue::text("now"));
        data.insert("updated_at".to_string(), FieldValue::text("now"));
        store.insert_record("proyectos", &data).unwrap()
    }

    #[test]
    fn test_detects_persisted_duplicate() {
        let conn = open_in_memory().unwrap();
        let store = RecordStore::new(&conn);
        let id = seed_project(&store, "Proyecto Alpha");

        let messages = Messages::default();
        let detector = DuplicateDetector::new(&messages);
        let row = RawRow::new().with("Nombre", "  Proyecto Alpha ");

        let result = detector
            .check(&store, &schema(), &row, None, &BatchClaims::new())
            .unwrap();
        assert_eq!(result.fields, vec!["nombre".to_string()]);
        assert_eq!(result.messages[0], "Ya existe un registro con el mismo Nombre");

        let result = detector
            .check(&store, &schema(), &row, Some(id), &BatchClaims::new())
            .unwrap();
        assert!(result.is_valid());
    }

    #[test]
    fn test_detects_in_batch_claim() {
        let conn = open_in_memory().unwrap();
        let store = RecordStore::new(&conn);
        let messages = Messages::default();
        let detector = DuplicateDetector::new(&messages);
        let mut claims = BatchClaims::new();

        let first = RawRow::new().with("nombre", "Proyecto Alpha");
        assert!(detector
            .check(&store, &schema(), &first, None, &claims)
            .unwrap()
            .is_valid());
        detector.claim_row(&schema(), &first, 1, &mut claims);

        let second = RawRow::new().with("nombre", "Proyecto Alpha ");
        let result = detector
            .check(&store, &schema(), &second, None, &claims)
            .unwrap();
        assert_eq!(result.fields, vec!["nombre".to_string()]);
        assert!(result.messages[0].contains("fila 1"));
    }

    #[test]
    fn test_normalized_values() {
        let email = FieldSpec::email("email", "Email").unique();
        let nif = FieldSpec::string("nif", "NIF").unique().uppercase();
        assert_eq!(normalized_unique_value(&email, " A@B.ES "), "a@b.es");
        assert_eq!(normalized_unique_value(&nif, " 12345678z "), "12345678Z");
    }

    #[test]
    fn test_composite_key_requires_every_part() {
        let schema = ImportSchema::new(
            EntityKind::Asignacion,
            vec![
                FieldSpec::reference("empleado", "Empleado", "empleado_id"),
                FieldSpec::date("fecha_inicio", "Fecha de inicio"),
            ],
        );
        let fields = ["empleado", "fecha_inicio"];

        let mut record = ProcessedRecord::new();
        record.set("empleado_id", FieldValue::Integer(7));
        assert_eq!(CompositeKey::from_record(&schema, &fields, &record), None);

        record.set("fecha_inicio", FieldValue::text("2024-01-01"));
        let key = CompositeKey::from_record(&schema, &fields, &record).unwrap();
        assert_eq!(key.fields(), ["empleado".to_string(), "fecha_inicio".to_string()]);

        let messages = Messages::default();
        let detector = DuplicateDetector::new(&messages);
        let conn = open_in_memory().unwrap();
        let store = RecordStore::new(&conn);
        let mut claims = BatchClaims::new();

        assert!(detector.check_composite(&store, &schema, &key, &claims).unwrap().is_valid());
        detector.claim_composite(&key, 1, &mut claims);
        let result = detector.check_composite(&store, &schema, &key, &claims).unwrap();
        assert_eq!(result.fields.len(), 2);
        assert!(result.messages[0].contains("Empleado, Fecha de inicio"));
    }
}
