// ==========================================
// 人力资源管理后台 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，将导入层/仓储层错误转换为调用方可理解的错误
// 说明: 行级失败不是 ApiError，而是 ImportBatchResult.invalid_rows
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 调用错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("未知的导入实体: {0}")]
    UnknownEntity(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 配置错误
    // ==========================================
    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::UnknownEntity(entity) => ApiError::UnknownEntity(entity),
            ImportError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            ImportError::Repository(e) => e.into(),
            ImportError::ConfigReadError { .. } | ImportError::ConfigValueError { .. } => {
                ApiError::ConfigError(err.to_string())
            }
            ImportError::SchemaInvariant(_) | ImportError::InternalError(_) => {
                ApiError::InternalError(err.to_string())
            }
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
