// ==========================================
// 人力资源管理后台 - 导入通用数据访问
// ==========================================
// 职责: 按表/列对实体表做查重、查找、计数、插入、更新
// 红线: Repository 不含业务规则，只做数据 CRUD
// 约束: 表名/列名只接受 [A-Za-z0-9_]，值一律参数化
// ==========================================
// 说明: RecordStore 借用一个 Connection；事务内通过 &Transaction
//      （Deref 到 Connection）构造，同一套方法在事务内外复用
// 前提: 连接须经 db::configure_sqlite_connection 注册 unicode_lower
// ==========================================

use crate::db::UNICODE_LOWER_FN;
use crate::domain::row::FieldValue;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use std::collections::BTreeMap;

/// 按列读出的一行记录
pub type StoredRecord = BTreeMap<String, FieldValue>;

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            FieldValue::Integer(i) => ToSqlOutput::from(*i),
            FieldValue::Bool(b) => ToSqlOutput::from(if *b { 1i64 } else { 0i64 }),
            FieldValue::Date(d) => ToSqlOutput::from(d.format("%Y-%m-%d").to_string()),
            FieldValue::Text(s) => ToSqlOutput::from(s.as_str()),
            FieldValue::Null => ToSqlOutput::from(rusqlite::types::Null),
        })
    }
}

fn field_value_from_ref(value: ValueRef<'_>) -> FieldValue {
    match value {
        ValueRef::Null => FieldValue::Null,
        ValueRef::Integer(i) => FieldValue::Integer(i),
        ValueRef::Real(f) => FieldValue::Text(f.to_string()),
        ValueRef::Text(t) => FieldValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(_) => FieldValue::Null,
    }
}

/// 校验 SQL 标识符
fn ident(name: &str) -> RepositoryResult<&str> {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(name)
    } else {
        Err(RepositoryError::InvalidIdentifier(name.to_string()))
    }
}

// ==========================================
// PersonCandidate - 人员候选（EntityResolver 使用）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonCandidate {
    pub id: i64,
    pub nombre: String,
    pub primer_apellido: String,
    pub segundo_apellido: Option<String>,
}

impl PersonCandidate {
    /// 规范全名: 各部分去空白、内部空白折叠为单空格、空的可选部分省略
    pub fn canonical_name(&self) -> String {
        let parts = [
            Some(self.nombre.as_str()),
            Some(self.primer_apellido.as_str()),
            self.segundo_apellido.as_deref(),
        ];

        parts
            .into_iter()
            .flatten()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

const PERSON_COLUMNS: &str = "id, nombre, primer_apellido, segundo_apellido";

fn map_person(row: &rusqlite::Row<'_>) -> rusqlite::Result<PersonCandidate> {
    Ok(PersonCandidate {
        id: row.get(0)?,
        nombre: row.get(1)?,
        primer_apellido: row.get(2)?,
        segundo_apellido: row.get(3)?,
    })
}

// ==========================================
// RecordStore - 通用记录存取
// ==========================================
#[derive(Clone, Copy)]
pub struct RecordStore<'a> {
    conn: &'a Connection,
}

impl<'a> RecordStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 是否存在 `column = value` 的记录（可排除指定 id）
    pub fn exists_by(
        &self,
        table: &str,
        column: &str,
        value: &str,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<bool> {
        let sql = format!(
            "SELECT 1 FROM {} WHERE {} = ?1 AND (?2 IS NULL OR id <> ?2) LIMIT 1",
            ident(table)?,
            ident(column)?
        );
        let found = self
            .conn
            .query_row(&sql, params![value, exclude_id], |_row| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// 是否存在各列同时等于给定值的记录（组合唯一查重）
    pub fn exists_by_columns(&self, table: &str, columns: &[(String, FieldValue)]) -> RepositoryResult<bool> {
        if columns.is_empty() {
            return Ok(false);
        }

        let conditions = columns
            .iter()
            .enumerate()
            .map(|(i, (column, _))| ident(column).map(|c| format!("{} = ?{}", c, i + 1)))
            .collect::<RepositoryResult<Vec<_>>>()?;
        let sql = format!(
            "SELECT 1 FROM {} WHERE {} LIMIT 1",
            ident(table)?,
            conditions.join(" AND ")
        );

        let values: Vec<&dyn ToSql> = columns.iter().map(|(_, v)| v as &dyn ToSql).collect();
        let found = self
            .conn
            .query_row(&sql, values.as_slice(), |_row| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// 按列精确查找 id（命中多条时取最小 id）
    pub fn find_id_by(&self, table: &str, column: &str, value: &str) -> RepositoryResult<Option<i64>> {
        let sql = format!(
            "SELECT id FROM {} WHERE {} = ?1 ORDER BY id LIMIT 1",
            ident(table)?,
            ident(column)?
        );
        let id = self
            .conn
            .query_row(&sql, params![value], |row| row.get(0))
            .optional()?;
        Ok(id)
    }

    /// 按列查找全部 id（Unicode 大小写不敏感，去除两端空白）
    pub fn find_ids_nocase(&self, table: &str, column: &str, value: &str) -> RepositoryResult<Vec<i64>> {
        let sql = format!(
            "SELECT id FROM {} WHERE {}(TRIM({})) = ?1 ORDER BY id",
            ident(table)?,
            UNICODE_LOWER_FN,
            ident(column)?
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map(params![value.trim().to_lowercase()], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    /// 按列读取整条记录
    pub fn find_by(&self, table: &str, column: &str, value: &str) -> RepositoryResult<Option<StoredRecord>> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?1 ORDER BY id LIMIT 1",
            ident(table)?,
            ident(column)?
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let record = stmt
            .query_row(params![value], |row| {
                let mut record = StoredRecord::new();
                for (idx, name) in names.iter().enumerate() {
                    record.insert(name.clone(), field_value_from_ref(row.get_ref(idx)?));
                }
                Ok(record)
            })
            .optional()?;
        Ok(record)
    }

    /// 读取单列文本
    pub fn get_text(&self, table: &str, id: i64, column: &str) -> RepositoryResult<Option<String>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1",
            ident(column)?,
            ident(table)?
        );
        let value: Option<Option<String>> = self
            .conn
            .query_row(&sql, params![id], |row| row.get(0))
            .optional()?;
        Ok(value.flatten())
    }

    /// 读取单列整数（外键列等）
    pub fn get_integer(&self, table: &str, id: i64, column: &str) -> RepositoryResult<Option<i64>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1",
            ident(column)?,
            ident(table)?
        );
        let value: Option<Option<i64>> = self
            .conn
            .query_row(&sql, params![id], |row| row.get(0))
            .optional()?;
        Ok(value.flatten())
    }

    /// 表行数
    pub fn count(&self, table: &str) -> RepositoryResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", ident(table)?);
        let n = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(n)
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入记录，返回新 id
    pub fn insert_record(&self, table: &str, data: &BTreeMap<String, FieldValue>) -> RepositoryResult<i64> {
        if data.is_empty() {
            return Err(RepositoryError::InternalError(format!(
                "空记录无法插入: {}",
                table
            )));
        }

        let columns = data
            .keys()
            .map(|k| ident(k))
            .collect::<RepositoryResult<Vec<_>>>()?;
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            ident(table)?,
            columns.join(", "),
            placeholders.join(", ")
        );

        let values: Vec<&dyn ToSql> = data.values().map(|v| v as &dyn ToSql).collect();
        self.conn.execute(&sql, values.as_slice())?;
        Ok(self.conn.last_insert_rowid())
    }

    /// 按 id 更新记录，返回受影响行数
    pub fn update_record(&self, table: &str, id: i64, data: &BTreeMap<String, FieldValue>) -> RepositoryResult<usize> {
        if data.is_empty() {
            return Ok(0);
        }

        let assignments = data
            .keys()
            .enumerate()
            .map(|(i, k)| ident(k).map(|k| format!("{} = ?{}", k, i + 1)))
            .collect::<RepositoryResult<Vec<_>>>()?;
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            ident(table)?,
            assignments.join(", "),
            data.len() + 1
        );

        let mut values: Vec<&dyn ToSql> = data.values().map(|v| v as &dyn ToSql).collect();
        values.push(&id);
        let rows = self.conn.execute(&sql, values.as_slice())?;
        Ok(rows)
    }

    // ==========================================
    // 人员候选（empleados）
    // ==========================================

    /// 前置过滤: 全名包含首个词元，或输入包含名字
    ///
    /// 覆盖精确匹配与双向子串匹配两层；大小写折叠走 unicode_lower，
    /// 与 Rust 侧 to_lowercase 的比较口径一致
    pub fn person_candidates_for_text(&self, text: &str) -> RepositoryResult<Vec<PersonCandidate>> {
        let text_lower = text.to_lowercase();
        let first_token = text_lower.split_whitespace().next().unwrap_or_default();
        let sql = format!(
            r#"
            SELECT {cols}
            FROM empleados
            WHERE instr({lower}(nombre || ' ' || primer_apellido || ' ' || COALESCE(segundo_apellido, '')), ?1) > 0
               OR instr(?2, {lower}(TRIM(nombre))) > 0
            ORDER BY id
            "#,
            cols = PERSON_COLUMNS,
            lower = UNICODE_LOWER_FN
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![first_token, text_lower], map_person)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// 名字部分匹配给定词元的候选
    pub fn person_candidates_by_given_name(&self, given: &str) -> RepositoryResult<Vec<PersonCandidate>> {
        let sql = format!(
            "SELECT {} FROM empleados WHERE instr({}(nombre), ?1) > 0 ORDER BY id",
            PERSON_COLUMNS, UNICODE_LOWER_FN
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![given.to_lowercase()], map_person)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// 全部人员（仅在行数低于上限时调用）
    pub fn all_persons(&self) -> RepositoryResult<Vec<PersonCandidate>> {
        let sql = format!("SELECT {} FROM empleados ORDER BY id", PERSON_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], map_person)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
