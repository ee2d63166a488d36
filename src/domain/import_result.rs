// ==========================================
// 人力资源管理后台 - 批次导入结果
// ==========================================
// 对外返回结构（camelCase，与调用方约定一致）
// ==========================================

use crate::domain::row::{RawRow, ValidationResult};
use crate::domain::types::{BatchState, EntityKind, ImportAction, ImportErrorType};
use serde::{Deserialize, Serialize};

// ==========================================
// InvalidRow - 失败行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidRow {
    /// 行号（从 1 开始，不含表头）
    pub row: usize,
    /// 原始输入回显
    pub data: RawRow,
    pub errors: ValidationResult,
    #[serde(rename = "type")]
    pub error_type: ImportErrorType,
}

// ==========================================
// EntitySummary - 已落库实体摘要
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySummary {
    pub id: i64,
    pub entity: EntityKind,
    pub action: ImportAction,
    pub display: String,
}

// ==========================================
// ImportBatchResult - 批次结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatchResult {
    pub batch_id: String,
    pub entity: EntityKind,
    pub state: BatchState,
    pub success: bool,
    pub imported: usize,
    pub created: usize,
    pub updated: usize,
    pub valid_rows: Vec<RawRow>,
    pub invalid_rows: Vec<InvalidRow>,
    pub imported_data: Vec<EntitySummary>,
    pub message: String,
}

impl ImportBatchResult {
    /// 构造未落库的结果（REJECTED / ROLLED_BACK）
    pub fn failed(
        batch_id: String,
        entity: EntityKind,
        state: BatchState,
        valid_rows: Vec<RawRow>,
        invalid_rows: Vec<InvalidRow>,
        message: String,
    ) -> Self {
        Self {
            batch_id,
            entity,
            state,
            success: false,
            imported: 0,
            created: 0,
            updated: 0,
            valid_rows,
            invalid_rows,
            imported_data: Vec::new(),
            message,
        }
    }

    /// 构造已提交的结果
    pub fn committed(
        batch_id: String,
        entity: EntityKind,
        valid_rows: Vec<RawRow>,
        imported_data: Vec<EntitySummary>,
        message: String,
    ) -> Self {
        let created = imported_data
            .iter()
            .filter(|s| s.action == ImportAction::Created)
            .count();
        let updated = imported_data.len() - created;

        Self {
            batch_id,
            entity,
            state: BatchState::Committed,
            success: true,
            imported: imported_data.len(),
            created,
            updated,
            valid_rows,
            invalid_rows: Vec::new(),
            imported_data,
            message,
        }
    }

    /// 涉及某字段的失败行
    pub fn invalid_rows_for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a InvalidRow> {
        self.invalid_rows.iter().filter(move |r| r.errors.has_field(field))
    }
}
