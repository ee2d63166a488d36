// ==========================================
// 人力资源管理后台 - 公司导入处理器
// ==========================================
// 自然键: CIF
// 引用: 法定代表人（员工，NIF / 邮箱 / 姓名）
// 依赖: 地址
// ==========================================

use super::{apply_reference, schema_field, ProcessingContext, RecordProcessor};
use crate::domain::row::{FieldValue, ProcessedRecord, RawRow};
use crate::domain::schema::{FieldSpec, ImportSchema};
use crate::domain::types::EntityKind;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::ImportResult;

pub struct EmpresaProcessor {
    schema: ImportSchema,
}

impl EmpresaProcessor {
    pub fn new() -> Self {
        let schema = ImportSchema::new(
            EntityKind::Empresa,
            vec![
                FieldSpec::string("nombre", "Nombre").required().unique().max_length(255),
                FieldSpec::string("cif", "CIF")
                    .required()
                    .unique()
                    .max_length(12)
                    .uppercase(),
                FieldSpec::email("email", "Email").max_length(255),
                FieldSpec::string("telefono", "Teléfono").max_length(20),
                FieldSpec::reference("representante", "Representante", "representante_id"),
                FieldSpec::dependent("direccion", "Dirección", "direccion_id"),
            ],
        );
        Self { schema }
    }
}

impl Default for EmpresaProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordProcessor for EmpresaProcessor {
    fn entity(&self) -> EntityKind {
        EntityKind::Empresa
    }

    fn schema(&self) -> &ImportSchema {
        &self.schema
    }

    fn example_rows(&self) -> Vec<Vec<String>> {
        vec![[
            "Acme Ibérica S.L.",
            "B12345678",
            "info@acme.es",
            "910000000",
            "Ana López García",
            "Gran Vía 10, 28013 Madrid",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()]
    }

    fn upsert_key(&self) -> Option<&'static str> {
        Some("cif")
    }

    fn resolve_references(
        &self,
        ctx: &mut ProcessingContext<'_, '_>,
        row: &RawRow,
        record: &mut ProcessedRecord,
    ) -> ImportResult<()> {
        let field = schema_field(&self.schema, "representante")?;
        if let Some(text) = row.value_of(field) {
            let result = ctx.resolver.resolve_employee(&ctx.store, text);
            apply_reference(ctx.messages, record, field, result)?;
        }
        Ok(())
    }

    fn apply_business_rules(&self, ctx: &ProcessingContext<'_, '_>, record: &mut ProcessedRecord) {
        if let Some(cif) = record.get("cif").and_then(FieldValue::as_text) {
            if !DataCleaner.looks_like_cif(cif) {
                record.errors.add(
                    "cif",
                    ctx.messages
                        .text_with("rules.invalid_tax_id", &[("label", "CIF")]),
                );
            }
        }
    }

    fn display_name(&self, record: &ProcessedRecord) -> String {
        record
            .get("nombre")
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
            .to_string()
    }
}
