// ==========================================
// 人力资源管理后台 - 导入 Schema 定义
// ==========================================
// 职责: 声明式描述某一实体可导入的字段（名称/标签/类型/必填/唯一/长度/选项）
// 约束: 启动时构建，运行期不可变
// ==========================================

use crate::domain::types::{EntityKind, FieldStorage, FieldType};
use crate::i18n::Messages;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 布尔字段的默认可选值（比较时大小写不敏感）
pub const BOOLEAN_OPTIONS: &[&str] = &["Sí", "Si", "No", "Yes", "True", "False", "1", "0"];

// ==========================================
// FieldSpec - 字段规格
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    pub unique: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// 对应的存储列（缺省与 name 相同）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(skip)]
    pub storage: FieldStorage,
    /// 规范化时转大写（税号类字段）
    #[serde(skip)]
    pub uppercase: bool,
}

impl FieldSpec {
    pub fn new(name: &str, label: &str, field_type: FieldType) -> Self {
        let options = match field_type {
            FieldType::Boolean => Some(BOOLEAN_OPTIONS.iter().map(|s| s.to_string()).collect()),
            _ => None,
        };

        Self {
            name: name.to_string(),
            label: label.to_string(),
            field_type,
            required: false,
            unique: false,
            max_length: None,
            min_length: None,
            options,
            column: None,
            storage: FieldStorage::Column,
            uppercase: false,
        }
    }

    pub fn string(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldType::String)
    }

    pub fn text(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldType::Text)
    }

    pub fn email(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldType::Email)
    }

    pub fn date(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldType::Date)
    }

    pub fn boolean(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldType::Boolean)
    }

    pub fn select(name: &str, label: &str, options: &[&str]) -> Self {
        Self::new(name, label, FieldType::Select).options(options)
    }

    /// 自由文本引用字段（解析为 `column` 指向的外键）
    pub fn reference(name: &str, label: &str, column: &str) -> Self {
        let mut spec = Self::string(name, label).column(column);
        spec.storage = FieldStorage::Reference;
        spec
    }

    /// 隐含创建依赖实体的字段（新实体 id 写回 `column`）
    pub fn dependent(name: &str, label: &str, column: &str) -> Self {
        let mut spec = Self::text(name, label).column(column);
        spec.storage = FieldStorage::Dependent;
        spec
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn options(mut self, options: &[&str]) -> Self {
        self.options = Some(options.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn column(mut self, column: &str) -> Self {
        self.column = Some(column.to_string());
        self
    }

    pub fn uppercase(mut self) -> Self {
        self.uppercase = true;
        self
    }

    /// 存储列名
    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }

    /// 在选项中查找（大小写不敏感），返回规范写法
    pub fn match_option(&self, value: &str) -> Option<&str> {
        let needle = value.trim().to_lowercase();
        self.options
            .as_ref()?
            .iter()
            .find(|opt| opt.to_lowercase() == needle)
            .map(|opt| opt.as_str())
    }

    /// 选项展示文本（逗号分隔）
    pub fn options_display(&self) -> String {
        self.options
            .as_ref()
            .map(|opts| opts.join(", "))
            .unwrap_or_default()
    }
}

// ==========================================
// Schema 不变量错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("字段名重复 (entity={entity}, field={field})")]
    DuplicateField { entity: String, field: String },

    #[error("枚举/布尔字段缺少选项 (entity={entity}, field={field})")]
    MissingOptions { entity: String, field: String },

    #[error("长度约束矛盾 (entity={entity}, field={field}): min={min} > max={max}")]
    InvalidLengthBounds {
        entity: String,
        field: String,
        min: usize,
        max: usize,
    },

    #[error("唯一字段不能是依赖实体字段 (entity={entity}, field={field})")]
    UniqueDependent { entity: String, field: String },

    #[error("组合唯一字段未定义 (entity={entity}, field={field})")]
    UnknownCompositeField { entity: String, field: String },
}

// ==========================================
// ImportSchema - 实体导入 Schema
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSchema {
    pub entity: EntityKind,
    pub fields: Vec<FieldSpec>,
}

impl ImportSchema {
    pub fn new(entity: EntityKind, fields: Vec<FieldSpec>) -> Self {
        Self { entity, fields }
    }

    /// 按字段名查找
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// 按存储列反查字段（先匹配 column，再匹配 name）
    pub fn field_by_column(&self, column: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|f| f.column.as_deref() == Some(column))
            .or_else(|| self.fields.iter().find(|f| f.name == column))
    }

    /// 唯一字段（按 schema 顺序）
    pub fn unique_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.unique)
    }

    /// 表头（标签列表）
    pub fn headers(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.label.clone()).collect()
    }

    /// 校验 Schema 不变量
    ///
    /// - 字段名不重复
    /// - select / boolean 必须有非空 options
    /// - min_length <= max_length
    /// - 唯一字段必须落在真实列上（不能是依赖实体字段）
    pub fn check_invariants(&self) -> Result<(), SchemaError> {
        let entity = self.entity.as_str().to_string();
        let mut seen = std::collections::HashSet::new();

        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    entity,
                    field: field.name.clone(),
                });
            }

            if matches!(field.field_type, FieldType::Select | FieldType::Boolean)
                && field.options.as_ref().map_or(true, |o| o.is_empty())
            {
                return Err(SchemaError::MissingOptions {
                    entity,
                    field: field.name.clone(),
                });
            }

            if let (Some(min), Some(max)) = (field.min_length, field.max_length) {
                if min > max {
                    return Err(SchemaError::InvalidLengthBounds {
                        entity,
                        field: field.name.clone(),
                        min,
                        max,
                    });
                }
            }

            if field.unique && field.storage == FieldStorage::Dependent {
                return Err(SchemaError::UniqueDependent {
                    entity,
                    field: field.name.clone(),
                });
            }
        }

        Ok(())
    }

    /// 生成模板数据（表头 + 示例行 + 填写说明）
    pub fn template_data(&self, example_data: Vec<Vec<String>>, messages: &Messages) -> TemplateData {
        let mut instructions = vec![messages.text("template.header_row")];

        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.label.as_str())
            .collect();
        if !required.is_empty() {
            instructions.push(messages.text_with(
                "template.required_marker",
                &[("fields", &required.join(", "))],
            ));
        }

        for field in &self.fields {
            let label = field.label.as_str();
            match field.field_type {
                FieldType::Date => {
                    instructions.push(messages.text_with("template.date_field", &[("label", label)]))
                }
                FieldType::Email => {
                    instructions.push(messages.text_with("template.email_field", &[("label", label)]))
                }
                FieldType::Select | FieldType::Boolean => instructions.push(messages.text_with(
                    "template.option_field",
                    &[("label", label), ("options", &field.options_display())],
                )),
                FieldType::String | FieldType::Text => {
                    if let Some(max) = field.max_length {
                        instructions.push(messages.text_with(
                            "template.length_field",
                            &[("label", label), ("max", &max.to_string())],
                        ));
                    }
                }
            }
            if field.unique {
                instructions.push(messages.text_with("template.unique_field", &[("label", label)]));
            }
        }

        instructions.push(messages.text("template.atomic"));

        TemplateData {
            headers: self.headers(),
            example_data,
            instructions,
        }
    }
}

// ==========================================
// TemplateData - 下载模板数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateData {
    pub headers: Vec<String>,
    pub example_data: Vec<Vec<String>>,
    pub instructions: Vec<String>,
}
