// ==========================================
// 人力资源管理后台 - 存储错误翻译器
// ==========================================
// 职责: 将提交阶段的存储约束错误映射回 Schema 字段的友好消息
// 识别: 唯一约束 / 非空约束（SQLite、PostgreSQL、MySQL 三种消息形态）
// 约束: 原始存储错误文本永不返回给调用方
// ==========================================

use crate::domain::row::ValidationResult;
use crate::domain::schema::ImportSchema;
use crate::i18n::Messages;
use crate::repository::error::RepositoryError;
use regex::Regex;
use std::sync::LazyLock;

// SQLite: "UNIQUE constraint failed: empleados.nif, empleados.email"
static SQLITE_UNIQUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"UNIQUE constraint failed: \w+\.(\w+)").expect("valid regex")
});

// SQLite: "NOT NULL constraint failed: empleados.nombre"
static SQLITE_NOT_NULL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"NOT NULL constraint failed: \w+\.(\w+)").expect("valid regex")
});

// PostgreSQL: "Key (nif)=(12345678Z) already exists."
static PG_UNIQUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Key \((\w+)(?:, *\w+)*\)=").expect("valid regex"));

// PostgreSQL: `null value in column "nombre" ... violates not-null constraint`
static PG_NOT_NULL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"null value in column "(\w+)""#).expect("valid regex"));

// MySQL: "Duplicate entry 'x' for key 'empleados_nif_unique'"
static MYSQL_UNIQUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Duplicate entry .* for key '(?:\w+\.)?(\w+)'").expect("valid regex")
});

// MySQL: "Column 'nombre' cannot be null"
static MYSQL_NOT_NULL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Column '(\w+)' cannot be null").expect("valid regex"));

/// 识别出的约束类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique(Option<String>),
    NotNull(Option<String>),
    ForeignKey,
    Unknown,
}

/// 从存储错误消息中识别约束类型与列名
pub fn classify(message: &str) -> ConstraintKind {
    let capture = |re: &Regex| re.captures(message).map(|c| c[1].to_string());

    if let Some(col) = capture(&SQLITE_UNIQUE_RE).or_else(|| capture(&PG_UNIQUE_RE)) {
        return ConstraintKind::Unique(Some(col));
    }
    if let Some(key) = capture(&MYSQL_UNIQUE_RE) {
        return ConstraintKind::Unique(Some(key));
    }
    if let Some(col) = capture(&SQLITE_NOT_NULL_RE)
        .or_else(|| capture(&PG_NOT_NULL_RE))
        .or_else(|| capture(&MYSQL_NOT_NULL_RE))
    {
        return ConstraintKind::NotNull(Some(col));
    }

    let upper = message.to_uppercase();
    if upper.contains("FOREIGN KEY") {
        ConstraintKind::ForeignKey
    } else if upper.contains("UNIQUE") || upper.contains("DUPLICATE") {
        ConstraintKind::Unique(None)
    } else if upper.contains("NOT NULL") || upper.contains("NOT-NULL") {
        ConstraintKind::NotNull(None)
    } else {
        ConstraintKind::Unknown
    }
}

pub struct ErrorTranslator<'m> {
    messages: &'m Messages,
}

impl<'m> ErrorTranslator<'m> {
    pub fn new(messages: &'m Messages) -> Self {
        Self { messages }
    }

    /// 将存储列名（或 MySQL 索引名）映射到 Schema 字段
    fn field_for<'s>(&self, schema: &'s ImportSchema, column: &str) -> Option<(&'s str, &'s str)> {
        if let Some(field) = schema.field_by_column(column) {
            return Some((field.name.as_str(), field.label.as_str()));
        }

        // 索引名形如 "{table}_{column}_unique"
        let table_prefix = format!("{}_", schema.entity.table());
        let stripped = column
            .strip_prefix(&table_prefix)
            .unwrap_or(column)
            .trim_end_matches("_unique");
        schema
            .field_by_column(stripped)
            .map(|field| (field.name.as_str(), field.label.as_str()))
    }

    /// 翻译一个提交阶段错误
    pub fn translate(&self, schema: &ImportSchema, err: &RepositoryError) -> ValidationResult {
        let mut result = ValidationResult::new();

        match classify(err.storage_message()) {
            ConstraintKind::Unique(column) => {
                match column.as_deref().and_then(|c| self.field_for(schema, c)) {
                    Some((name, label)) => result.add(
                        name,
                        self.messages.text_with("database.unique", &[("label", label)]),
                    ),
                    None => result.add_message(self.messages.text("database.unique_generic")),
                }
            }
            ConstraintKind::NotNull(column) => {
                match column.as_deref().and_then(|c| self.field_for(schema, c)) {
                    Some((name, label)) => result.add(
                        name,
                        self.messages.text_with("database.not_null", &[("label", label)]),
                    ),
                    None => result.add_message(self.messages.text("database.not_null_generic")),
                }
            }
            ConstraintKind::ForeignKey => {
                result.add_message(self.messages.text("database.foreign_key"))
            }
            ConstraintKind::Unknown => result.add_message(self.messages.text("database.generic")),
        }

        result
    }

    /// 依赖实体创建失败: 归到触发字段
    pub fn translate_dependent(&self, schema: &ImportSchema, field: &str) -> ValidationResult {
        let mut result = ValidationResult::new();
        let label = schema
            .field(field)
            .map(|f| f.label.as_str())
            .unwrap_or(field);
        result.add(
            field,
            self.messages
                .text_with("database.dependent_failed", &[("label", label)]),
        );
        result
    }
}
