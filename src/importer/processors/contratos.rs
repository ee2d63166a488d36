// ==========================================
// 人力资源管理后台 - 合同导入处理器
// ==========================================
// 自然键: 合同编号
// 引用: 员工（NIF / 邮箱 / 姓名）
// 规则:
// - 结束日期晚于开始日期
// - 临时合同必须有结束日期
// - 非全日制合同必须填写周工时，工时范围 1..=40
// ==========================================

use super::{apply_reference, check_date_order, schema_field, ProcessingContext, RecordProcessor};
use crate::domain::row::{FieldValue, ProcessedRecord, RawRow};
use crate::domain::schema::{FieldSpec, ImportSchema};
use crate::domain::types::EntityKind;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::ImportResult;

/// 周工时范围
pub const MIN_WEEKLY_HOURS: i64 = 1;
pub const MAX_WEEKLY_HOURS: i64 = 40;

/// 必须有结束日期的合同类型
const FIXED_TERM_TYPES: &[&str] = &["Temporal", "Prácticas", "Formación"];

pub struct ContratoProcessor {
    schema: ImportSchema,
}

impl ContratoProcessor {
    pub fn new() -> Self {
        let schema = ImportSchema::new(
            EntityKind::Contrato,
            vec![
                FieldSpec::string("codigo", "Código").required().unique().max_length(50),
                FieldSpec::reference("empleado", "Empleado", "empleado_id").required(),
                FieldSpec::select(
                    "tipo_contrato",
                    "Tipo de contrato",
                    &["Indefinido", "Temporal", "Prácticas", "Formación"],
                )
                .required(),
                FieldSpec::date("fecha_inicio", "Fecha de inicio").required(),
                FieldSpec::date("fecha_fin", "Fecha de fin"),
                FieldSpec::boolean("jornada_completa", "Jornada completa"),
                FieldSpec::string("horas_semanales", "Horas semanales").max_length(3),
            ],
        );
        Self { schema }
    }

    /// 字段标签（取自 Schema，字段缺失时退回字段名）
    fn label(&self, name: &'static str) -> &str {
        self.schema.field(name).map_or(name, |f| f.label.as_str())
    }

    fn check_hours(&self, ctx: &ProcessingContext<'_, '_>, record: &mut ProcessedRecord) {
        let label = self.label("horas_semanales");
        let part_time = matches!(record.get("jornada_completa"), Some(FieldValue::Bool(false)));

        let raw = record
            .get("horas_semanales")
            .and_then(FieldValue::as_text)
            .map(str::to_string);

        match raw {
            None if part_time => record.errors.add(
                "horas_semanales",
                ctx.messages
                    .text_with("rules.hours_required", &[("label", label)]),
            ),
            None => {}
            Some(text) => match DataCleaner.parse_integer(&text) {
                Some(hours) if (MIN_WEEKLY_HOURS..=MAX_WEEKLY_HOURS).contains(&hours) => {
                    record.set("horas_semanales", FieldValue::Integer(hours));
                }
                _ => record.errors.add(
                    "horas_semanales",
                    ctx.messages.text_with(
                        "rules.hours_range",
                        &[
                            ("label", label),
                            ("min", &MIN_WEEKLY_HOURS.to_string()),
                            ("max", &MAX_WEEKLY_HOURS.to_string()),
                        ],
                    ),
                ),
            },
        }
    }
}

impl Default for ContratoProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordProcessor for ContratoProcessor {
    fn entity(&self) -> EntityKind {
        EntityKind::Contrato
    }

    fn schema(&self) -> &ImportSchema {
        &self.schema
    }

    fn example_rows(&self) -> Vec<Vec<String>> {
        vec![
            ["CT-2024-001", "12345678Z", "Indefinido", "2024-01-08", "", "Sí", ""],
            ["CT-2024-002", "Ana López García", "Temporal", "2024-02-01", "2024-07-31", "No", "20"],
        ]
        .iter()
        .map(|row| row.iter().map(|s| s.to_string()).collect())
        .collect()
    }

    fn upsert_key(&self) -> Option<&'static str> {
        Some("codigo")
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

    fn apply_business_rules(&self, ctx: &ProcessingContext<'_, '_>, record: &mut ProcessedRecord) {
        check_date_order(ctx.messages, &self.schema, record, "fecha_inicio", "fecha_fin");

        let tipo = record
            .get("tipo_contrato")
            .and_then(FieldValue::as_text)
            .map(str::to_string);
        if let Some(tipo) = tipo {
            if FIXED_TERM_TYPES.contains(&tipo.as_str()) && record.get("fecha_fin").is_none() {
                record.errors.add(
                    "fecha_fin",
                    ctx.messages.text_with(
                        "rules.end_required",
                        &[("label", self.label("fecha_fin")), ("type", &tipo)],
                    ),
                );
            }
        }

        self.check_hours(ctx, record);
    }

    fn display_name(&self, record: &ProcessedRecord) -> String {
        record
            .get("codigo")
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
            .to_string()
    }
}
