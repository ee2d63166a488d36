// ==========================================
// 人力资源管理后台 - 导入批次审计仓储
// ==========================================
// 职责: 记录每个导入批次的结果（import_batch 表）
// 约束: 在提交事务之外写入，回滚的批次同样留痕
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

// ==========================================
// ImportBatchLog - 批次审计记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportBatchLog {
    pub batch_id: String,
    pub entity: String,
    pub actor: String,
    pub status: String,
    pub total_rows: i64,
    pub imported_rows: i64,
    pub created_rows: i64,
    pub updated_rows: i64,
    pub invalid_rows: i64,
    pub elapsed_ms: i64,
    pub errors_json: Option<String>,
    pub imported_at: String,
}

// ==========================================
// ImportBatchLogRepository
// ==========================================
pub struct ImportBatchLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ImportBatchLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入批次记录
    pub fn insert(&self, log: &ImportBatchLog) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO import_batch (
                batch_id, entity, actor, status, total_rows, imported_rows,
                created_rows, updated_rows, invalid_rows, elapsed_ms,
                errors_json, imported_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                log.batch_id,
                log.entity,
                log.actor,
                log.status,
                log.total_rows,
                log.imported_rows,
                log.created_rows,
                log.updated_rows,
                log.invalid_rows,
                log.elapsed_ms,
                log.errors_json,
                log.imported_at,
            ],
        )?;

        Ok(())
    }

    /// 最近的批次（按时间倒序）
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<ImportBatchLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT batch_id, entity, actor, status, total_rows, imported_rows,
                   created_rows, updated_rows, invalid_rows, elapsed_ms,
                   errors_json, imported_at
            FROM import_batch
            ORDER BY imported_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;

        let logs = stmt
            .query_map(params![limit as i64], |row| {
                Ok(ImportBatchLog {
                    batch_id: row.get(0)?,
                    entity: row.get(1)?,
                    actor: row.get(2)?,
                    status: row.get(3)?,
                    total_rows: row.get(4)?,
                    imported_rows: row.get(5)?,
                    created_rows: row.get(6)?,
                    updated_rows: row.get(7)?,
                    invalid_rows: row.get(8)?,
                    elapsed_ms: row.get(9)?,
                    errors_json: row.get(10)?,
                    imported_at: row.get(11)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(logs)
    }
}
