// ==========================================
// 人力资源管理后台 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 行级校验失败不走 Err，而是写入 ValidationResult；
//      ImportError 只表示引擎层面的异常（未知实体、锁、仓储、配置）
// ==========================================

use crate::domain::schema::SchemaError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 调用错误 =====
    #[error("未知的导入实体: {0}")]
    UnknownEntity(String),

    #[error("Schema 定义错误: {0}")]
    SchemaInvariant(#[from] SchemaError),

    // ===== 数据库错误 =====
    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::Repository(RepositoryError::from(err))
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
