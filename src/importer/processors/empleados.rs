// ==========================================
// 人力资源管理后台 - 员工导入处理器
// ==========================================
// 自然键: NIF（已存在则更新）
// 引用: 公司（CIF 或名称）
// 依赖: 地址（自由文本 → direcciones）
// 规则: NIF/NIE 控制字母；出生日期不晚于今天
// ==========================================

use super::{
    apply_reference, check_not_future, schema_field, ProcessingContext, RecordProcessor,
};
use crate::domain::row::{FieldValue, ProcessedRecord, RawRow};
use crate::domain::schema::{FieldSpec, ImportSchema};
use crate::domain::types::EntityKind;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::ImportResult;

pub struct EmpleadoProcessor {
    schema: ImportSchema,
}

impl EmpleadoProcessor {
    pub fn new() -> Self {
        let schema = ImportSchema::new(
            EntityKind::Empleado,
            vec![
                FieldSpec::string("nombre", "Nombre").required().max_length(100),
                FieldSpec::string("primer_apellido", "Primer apellido")
                    .required()
                    .max_length(100),
                FieldSpec::string("segundo_apellido", "Segundo apellido").max_length(100),
                FieldSpec::string("nif", "NIF")
                    .required()
                    .unique()
                    .max_length(12)
                    .uppercase(),
                FieldSpec::email("email", "Email").required().unique().max_length(255),
                FieldSpec::string("telefono", "Teléfono").max_length(20),
                FieldSpec::string("numero_seguridad_social", "Nº Seguridad Social")
                    .unique()
                    .max_length(20),
                FieldSpec::date("fecha_nacimiento", "Fecha de nacimiento"),
                FieldSpec::select("genero", "Género", &["Masculino", "Femenino", "Otro"]),
                FieldSpec::reference("empresa", "Empresa", "empresa_id"),
                FieldSpec::dependent("direccion", "Dirección", "direccion_id"),
            ],
        );
        Self { schema }
    }
}

impl Default for EmpleadoProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordProcessor for EmpleadoProcessor {
    fn entity(&self) -> EntityKind {
        EntityKind::Empleado
    }

    fn schema(&self) -> &ImportSchema {
        &self.schema
    }

    fn example_rows(&self) -> Vec<Vec<String>> {
        vec![[
            "Ana",
            "López",
            "García",
            "12345678Z",
            "ana.lopez@example.com",
            "600123456",
            "281234567890",
            "1990-03-15",
            "Femenino",
            "B12345678",
            "Calle Mayor 1, 28001 Madrid",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()]
    }

    fn upsert_key(&self) -> Option<&'static str> {
        Some("nif")
    }

    fn resolve_references(
        &self,
        ctx: &mut ProcessingContext<'_, '_>,
        row: &RawRow,
        record: &mut ProcessedRecord,
    ) -> ImportResult<()> {
        let field = schema_field(&self.schema, "empresa")?;
        if let Some(text) = row.value_of(field) {
            let result = ctx.resolver.resolve_company(&ctx.store, text);
            apply_reference(ctx.messages, record, field, result)?;
        }
        Ok(())
    }

    fn apply_business_rules(&self, ctx: &ProcessingContext<'_, '_>, record: &mut ProcessedRecord) {
        if let Some(nif) = record.get("nif").and_then(FieldValue::as_text) {
            if !DataCleaner.is_valid_nif(nif) {
                record.errors.add(
                    "nif",
                    ctx.messages
                        .text_with("rules.invalid_tax_id", &[("label", "NIF")]),
                );
            }
        }

        check_not_future(ctx.messages, &self.schema, record, "fecha_nacimiento", ctx.today);
    }

    fn display_name(&self, record: &ProcessedRecord) -> String {
        ["nombre", "primer_apellido", "segundo_apellido"]
            .iter()
            .filter_map(|c| record.get(c).and_then(FieldValue::as_text))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::i18n::Messages;
    use crate::importer::entity_resolver::EntityResolver;
    use crate::importer::processors::process_record;
    use crate::repository::import_repo::RecordStore;
    use chrono::NaiveDate;

    fn base_row() -> RawRow {
        RawRow::new()
            .with("nombre", "Ana")
            .with("primer_apellido", "López")
            .with("nif", "12345678Z")
            .with("email", "ana@example.com")
    }

    #[test]
    fn test_rules_reject_bad_nif_and_future_birth() {
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

        let row = base_row()
            .with("nif", "12345678A")
            .with("fecha_nacimiento", "2030-01-01");
        let record = process_record(&processor, &mut ctx, &row).unwrap();

        assert_eq!(record.errors.fields, vec!["nif", "fecha_nacimiento"]);
    }

    #[test]
    fn test_unknown_company_is_field_error() {
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

        let row = base_row().with("empresa", "Globex");
        let record = process_record(&processor, &mut ctx, &row).unwrap();

        assert_eq!(record.errors.fields, vec!["empresa"]);
        assert!(record.get("empresa_id").is_none());
    }
}
