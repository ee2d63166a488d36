// ==========================================
// 人力资源管理后台 - 项目导入处理器
// ==========================================
// 引用: 负责人（按姓名分层匹配）
// 规则: 结束日期晚于开始日期
// ==========================================

use super::{apply_reference, check_date_order, schema_field, ProcessingContext, RecordProcessor};
use crate::domain::row::{FieldValue, ProcessedRecord, RawRow};
use crate::domain::schema::{FieldSpec, ImportSchema};
use crate::domain::types::EntityKind;
use crate::importer::error::ImportResult;

pub struct ProyectoProcessor {
    schema: ImportSchema,
}

impl ProyectoProcessor {
    pub fn new() -> Self {
        let schema = ImportSchema::new(
            EntityKind::Proyecto,
            vec![
                FieldSpec::string("nombre", "Nombre").required().unique().max_length(255),
                FieldSpec::text("descripcion", "Descripción").max_length(2000),
                FieldSpec::reference("responsable_nombre", "Responsable", "responsable_id"),
                FieldSpec::date("fecha_inicio", "Fecha de inicio"),
                FieldSpec::date("fecha_fin", "Fecha de fin"),
                FieldSpec::select(
                    "estado",
                    "Estado",
                    &["Planificado", "En curso", "Finalizado", "Cancelado"],
                ),
            ],
        );
        Self { schema }
    }
}

impl Default for ProyectoProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordProcessor for ProyectoProcessor {
    fn entity(&self) -> EntityKind {
        EntityKind::Proyecto
    }

    fn schema(&self) -> &ImportSchema {
        &self.schema
    }

    fn example_rows(&self) -> Vec<Vec<String>> {
        vec![[
            "Proyecto Alpha",
            "Q1 project",
            "Ana López García",
            "2024-01-08",
            "2024-03-29",
            "En curso",
        ]
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
        let field = schema_field(&self.schema, "responsable_nombre")?;
        if let Some(text) = row.value_of(field) {
            let result = ctx.resolver.resolve_person(&ctx.store, text);
            apply_reference(ctx.messages, record, field, result)?;
        }
        Ok(())
    }

    fn apply_business_rules(&self, ctx: &ProcessingContext<'_, '_>, record: &mut ProcessedRecord) {
        check_date_order(ctx.messages, &self.schema, record, "fecha_inicio", "fecha_fin");
    }

    fn display_name(&self, record: &ProcessedRecord) -> String {
        record
            .get("nombre")
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
            .to_string()
    }
}
