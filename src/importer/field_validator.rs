// ==========================================
// 人力资源管理后台 - 字段校验器
// ==========================================
// 职责: 按 Schema 校验单行（必填 / 类型 / 选项 / 长度）
// 约束: 按 Schema 字段顺序；必填失败即停止该字段的后续检查
// 约束: 永不返回 Err，所有问题进入 ValidationResult
// ==========================================

use crate::domain::row::{RawRow, ValidationResult};
use crate::domain::schema::{FieldSpec, ImportSchema};
use crate::domain::types::FieldType;
use crate::i18n::Messages;
use crate::importer::data_cleaner::DataCleaner;
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex")
});

pub struct FieldValidator<'m> {
    messages: &'m Messages,
    cleaner: DataCleaner,
}

impl<'m> FieldValidator<'m> {
    pub fn new(messages: &'m Messages) -> Self {
        Self {
            messages,
            cleaner: DataCleaner,
        }
    }

    /// 校验一整行
    pub fn validate(&self, row: &RawRow, schema: &ImportSchema) -> ValidationResult {
        let mut result = ValidationResult::new();
        for field in &schema.fields {
            self.validate_field(row, field, &mut result);
        }
        result
    }

    fn validate_field(&self, row: &RawRow, field: &FieldSpec, result: &mut ValidationResult) {
        let label = field.label.as_str();

        let value = match row.value_of(field) {
            Some(v) => v,
            None => {
                if field.required {
                    result.add(
                        &field.name,
                        self.messages.text_with("validation.required", &[("label", label)]),
                    );
                }
                return;
            }
        };

        match field.field_type {
            FieldType::Email => {
                if !EMAIL_RE.is_match(value) {
                    result.add(
                        &field.name,
                        self.messages
                            .text_with("validation.invalid_email", &[("label", label)]),
                    );
                }
            }
            FieldType::Date => {
                if self.cleaner.parse_date(value).is_none() {
                    result.add(
                        &field.name,
                        self.messages
                            .text_with("validation.invalid_date", &[("label", label)]),
                    );
                }
            }
            FieldType::Boolean | FieldType::Select => {
                if field.match_option(value).is_none() {
                    result.add(
                        &field.name,
                        self.messages.text_with(
                            "validation.invalid_option",
                            &[("label", label), ("options", &field.options_display())],
                        ),
                    );
                }
            }
            FieldType::String | FieldType::Text => {
                let len = value.chars().count();
                if let Some(max) = field.max_length {
                    if len > max {
                        result.add(
                            &field.name,
                            self.messages.text_with(
                                "validation.max_length",
                                &[("label", label), ("max", &max.to_string())],
                            ),
                        );
                    }
                }
                if let Some(min) = field.min_length {
                    if len < min {
                        result.add(
                            &field.name,
                            self.messages.text_with(
                                "validation.min_length",
                                &[("label", label), ("min", &min.to_string())],
                            ),
                        );
                    }
                }
            }
        }
    }
}
