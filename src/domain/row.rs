// ==========================================
// 人力资源管理后台 - 导入行与中间结果
// ==========================================
// RawRow: 外部解析层交来的原始行（插入有序，键为字段名或标签）
// ValidationResult: 行级错误集合
// ProcessedRecord: 解析/规范化后可直接落库的载荷
// ==========================================

use crate::domain::schema::FieldSpec;
use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// RawRow - 原始行
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    entries: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一列（同名键覆盖原值，保留原位置）
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// 链式构造
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// 按键精确取值
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 按字段取值：先 name，name 缺失或空白时取 label
    pub fn get(&self, field: &FieldSpec) -> Option<&str> {
        let by_name = self.raw(&field.name);
        match by_name {
            Some(v) if !v.trim().is_empty() => Some(v),
            _ => self.raw(&field.label).or(by_name),
        }
    }

    /// 按字段取去空白后的非空值
    pub fn value_of(&self, field: &FieldSpec) -> Option<&str> {
        self.get(field).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl Serialize for RawRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct RawRowVisitor;

impl<'de> Visitor<'de> for RawRowVisitor {
    type Value = RawRow;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object mapping column names to values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RawRow, A::Error> {
        let mut row = RawRow::new();
        while let Some((key, value)) = access.next_entry::<String, serde_json::Value>()? {
            // 解析层可能交来数字/布尔，统一转为原始字符串
            let text = match value {
                serde_json::Value::Null => String::new(),
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            row.insert(key, text);
        }
        Ok(row)
    }
}

impl<'de> Deserialize<'de> for RawRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RawRowVisitor)
    }
}

// ==========================================
// ValidationResult - 行级错误集合
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub messages: Vec<String>,
    /// 涉及的字段（去重，按首次出现顺序）
    pub fields: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一条字段级错误
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.messages.push(message.into());
        if !self.fields.iter().any(|f| f == field) {
            self.fields.push(field.to_string());
        }
    }

    /// 记录一条同时指向多个字段的错误（组合唯一等）
    pub fn add_for_fields(&mut self, fields: &[String], message: impl Into<String>) {
        self.messages.push(message.into());
        for field in fields {
            if !self.fields.contains(field) {
                self.fields.push(field.clone());
            }
        }
    }

    /// 记录一条不指向具体字段的错误
    pub fn add_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.messages.extend(other.messages);
        for field in other.fields {
            if !self.fields.contains(&field) {
                self.fields.push(field);
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}

// ==========================================
// FieldValue - 规范化后的列值
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Bool(bool),
    Date(NaiveDate),
    Text(String),
    Null,
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Bool(b) => write!(f, "{}", if *b { 1 } else { 0 }),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Null => Ok(()),
        }
    }
}

// ==========================================
// DependentRecord - 依赖实体（如地址）
// ==========================================
// 在提交事务内先于主记录创建，新 id 写回主记录的 `column`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependentRecord {
    pub table: &'static str,
    /// 触发创建的 schema 字段（错误定位用）
    pub field: String,
    /// 主记录上的外键列
    pub column: String,
    pub data: BTreeMap<String, FieldValue>,
}

// ==========================================
// NaturalKey - 自然键（用于 upsert）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaturalKey {
    pub column: String,
    pub value: String,
}

// ==========================================
// ProcessedRecord - 可落库载荷
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedRecord {
    /// 列名 -> 值（可选字段为空时不出现，更新时保留原值）
    pub data: BTreeMap<String, FieldValue>,
    pub errors: ValidationResult,
    pub dependents: Vec<DependentRecord>,
    pub natural_key: Option<NaturalKey>,
    /// 展示名称（importedData / 事件使用）
    pub display: String,
}

impl ProcessedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: &str, value: FieldValue) {
        self.data.insert(column.to_string(), value);
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.data.get(column)
    }

    pub fn is_ready(&self) -> bool {
        self.errors.is_valid()
    }
}
