// ==========================================
// 人力资源管理后台 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约束: 约束类错误保留存储层原始消息，供 ErrorTranslator 解析列名
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    // ===== 数据库错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    // ===== 约束错误 =====
    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("非空约束违反: {0}")]
    NotNullViolation(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    // ===== 调用错误 =====
    #[error("非法标识符: {0}")]
    InvalidIdentifier(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

impl RepositoryError {
    /// 存储层原始消息（不含本层前缀）
    pub fn storage_message(&self) -> &str {
        match self {
            RepositoryError::UniqueConstraintViolation(msg)
            | RepositoryError::NotNullViolation(msg)
            | RepositoryError::ForeignKeyViolation(msg)
            | RepositoryError::DatabaseQueryError(msg)
            | RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::LockError(msg)
            | RepositoryError::InvalidIdentifier(msg)
            | RepositoryError::InternalError(msg) => msg,
            RepositoryError::NotFound { entity, .. } => entity,
        }
    }

    /// 是否为约束类错误（提交阶段可翻译为字段错误）
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            RepositoryError::UniqueConstraintViolation(_)
                | RepositoryError::NotNullViolation(_)
                | RepositoryError::ForeignKeyViolation(_)
        )
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("NOT NULL") {
                    RepositoryError::NotNullViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
