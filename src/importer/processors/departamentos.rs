// ==========================================
// 人力资源管理后台 - 部门导入处理器
// ==========================================
// 引用: 公司（必填）、负责人（员工）
// ==========================================

use super::{apply_reference, schema_field, ProcessingContext, RecordProcessor};
use crate::domain::row::{FieldValue, ProcessedRecord, RawRow};
use crate::domain::schema::{FieldSpec, ImportSchema};
use crate::domain::types::EntityKind;
use crate::importer::error::ImportResult;

pub struct DepartamentoProcessor {
    schema: ImportSchema,
}

impl DepartamentoProcessor {
    pub fn new() -> Self {
        let schema = ImportSchema::new(
            EntityKind::Departamento,
            vec![
                FieldSpec::string("nombre", "Nombre").required().unique().max_length(255),
                FieldSpec::text("descripcion", "Descripción").max_length(1000),
                FieldSpec::reference("empresa", "Empresa", "empresa_id").required(),
                FieldSpec::reference("responsable", "Responsable", "responsable_id"),
            ],
        );
        Self { schema }
    }
}

impl Default for DepartamentoProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordProcessor for DepartamentoProcessor {
    fn entity(&self) -> EntityKind {
        EntityKind::Departamento
    }

    fn schema(&self) -> &ImportSchema {
        &self.schema
    }

    fn example_rows(&self) -> Vec<Vec<String>> {
        vec![["Recursos Humanos", "Gestión de personal", "B12345678", "Ana López García"]
            .iter()
            .map(|s| s.to_string())
            .collect()]
    }

    fn resolve_references(
        &self,
        ctx: &mut ProcessingContext<'_, '_>,
        row: &RawRow,
        record: &mut ProcessedRecord,
    ) -> ImportResult<()> {
        let empresa = schema_field(&self.schema, "empresa")?;
        if let Some(text) = row.value_of(empresa) {
            let result = ctx.resolver.resolve_company(&ctx.store, text);
            apply_reference(ctx.messages, record, empresa, result)?;
        }

        let responsable = schema_field(&self.schema, "responsable")?;
        if let Some(text) = row.value_of(responsable) {
            let result = ctx.resolver.resolve_employee(&ctx.store, text);
            apply_reference(ctx.messages, record, responsable, result)?;
        }

        Ok(())
    }

    fn display_name(&self, record: &ProcessedRecord) -> String {
        record
            .get("nombre")
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
            .to_string()
    }
}
