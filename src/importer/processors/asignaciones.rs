// ==========================================
// 人力资源管理后台 - 部门分配导入处理器
// ==========================================
// 引用: 员工、部门（均必填）
// 规则: 结束日期晚于开始日期
// 组合唯一: (员工, 部门, 开始日期)，第一阶段按解析后的 id 判重；
//          存储层 UNIQUE 约束兜底并发写入
// ==========================================

use super::{apply_reference, check_date_order, schema_field, ProcessingContext, RecordProcessor};
use crate::domain::row::{FieldValue, ProcessedRecord, RawRow};
use crate::domain::schema::{FieldSpec, ImportSchema};
use crate::domain::types::EntityKind;
use crate::importer::error::ImportResult;

pub struct AsignacionProcessor {
    schema: ImportSchema,
}

impl AsignacionProcessor {
    pub fn new() -> Self {
        let schema = ImportSchema::new(
            EntityKind::Asignacion,
            vec![
                FieldSpec::reference("empleado", "Empleado", "empleado_id").required(),
                FieldSpec::reference("departamento", "Departamento", "departamento_id").required(),
                FieldSpec::string("puesto", "Puesto").required().max_length(100),
                FieldSpec::date("fecha_inicio", "Fecha de inicio").required(),
                FieldSpec::date("fecha_fin", "Fecha de fin"),
                FieldSpec::boolean("es_principal", "Asignación principal"),
            ],
        );
        Self { schema }
    }
}

impl Default for AsignacionProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordProcessor for AsignacionProcessor {
    fn entity(&self) -> EntityKind {
        EntityKind::Asignacion
    }

    fn schema(&self) -> &ImportSchema {
        &self.schema
    }

    fn example_rows(&self) -> Vec<Vec<String>> {
        vec![["12345678Z", "Recursos Humanos", "Técnica de selección", "2024-01-08", "", "Sí"]
            .iter()
            .map(|s| s.to_string())
            .collect()]
    }

    fn composite_unique(&self) -> &'static [&'static str] {
        &["empleado", "departamento", "fecha_inicio"]
    }

    fn resolve_references(
        &self,
        ctx: &mut ProcessingContext<'_, '_>,
        row: &RawRow,
        record: &mut ProcessedRecord,
    ) -> ImportResult<()> {
        let empleado = schema_field(&self.schema, "empleado")?;
        if let Some(text) = row.value_of(empleado) {
            let result = ctx.resolver.resolve_employee(&ctx.store, text);
            apply_reference(ctx.messages, record, empleado, result)?;
        }

        let departamento = schema_field(&self.schema, "departamento")?;
        if let Some(text) = row.value_of(departamento) {
            let result = ctx.resolver.resolve_department(&ctx.store, text);
            apply_reference(ctx.messages, record, departamento, result)?;
        }

        Ok(())
    }

    fn apply_business_rules(&self, ctx: &ProcessingContext<'_, '_>, record: &mut ProcessedRecord) {
        check_date_order(ctx.messages, &self.schema, record, "fecha_inicio", "fecha_fin");
    }

    fn display_name(&self, record: &ProcessedRecord) -> String {
        let puesto = record
            .get("puesto")
            .and_then(FieldValue::as_text)
            .unwrap_or_default();
        let desde = record
            .get("fecha_inicio")
            .map(|d| d.to_string())
            .unwrap_or_default();
        format!("{} ({})", puesto, desde)
    }
}
