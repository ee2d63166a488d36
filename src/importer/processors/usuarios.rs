// ==========================================
// 人力资源管理后台 - 系统用户导入处理器
// ==========================================
// 自然键: 邮箱
// 引用: 关联员工（可选）
// ==========================================

use super::{apply_reference, schema_field, ProcessingContext, RecordProcessor};
use crate::domain::row::{FieldValue, ProcessedRecord, RawRow};
use crate::domain::schema::{FieldSpec, ImportSchema};
use crate::domain::types::EntityKind;
use crate::importer::error::ImportResult;

pub struct UsuarioProcessor {
    schema: ImportSchema,
}

impl UsuarioProcessor {
    pub fn new() -> Self {
        let schema = ImportSchema::new(
            EntityKind::Usuario,
            vec![
                FieldSpec::string("nombre", "Nombre").required().max_length(255),
                FieldSpec::email("email", "Email").required().unique().max_length(255),
                FieldSpec::select("rol", "Rol", &["Administrador", "Responsable", "Empleado"])
                    .required(),
                FieldSpec::boolean("activo", "Activo"),
                FieldSpec::reference("empleado", "Empleado", "empleado_id"),
            ],
        );
        Self { schema }
    }
}

impl Default for UsuarioProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordProcessor for UsuarioProcessor {
    fn entity(&self) -> EntityKind {
        EntityKind::Usuario
    }

    fn schema(&self) -> &ImportSchema {
        &self.schema
    }

    fn example_rows(&self) -> Vec<Vec<String>> {
        vec![["Ana López", "ana.lopez@example.com", "Empleado", "Sí", "12345678Z"]
            .iter()
            .map(|s| s.to_string())
            .collect()]
    }

    fn upsert_key(&self) -> Option<&'static str> {
        Some("email")
    }

    fn resolve_references(
        &self,
        ctx: &mut ProcessingContext<'_, '_>,
        row: &RawRow,
        record: &mut ProcessedRecord,
    ) -> ImportResult<()> {
        let field = schema_field(&self.schema, "empleado")?;
        if let Some(text) = row.value_of(field) {
            let result = ctx.resolver.resolve_employee(&ctx.store, text);
            apply_reference(ctx.messages, record, field, result)?;
        }
        Ok(())
    }

    fn display_name(&self, record: &ProcessedRecord) -> String {
        record
            .get("email")
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
            .to_string()
    }
}
