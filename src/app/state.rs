// ==========================================
// 人力资源管理后台 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::ImportApi;
use crate::config::ConfigManager;
use crate::db::{open_sqlite_connection, run_migrations};
use crate::importer::ImportEngine;
use crate::repository::ImportBatchLogRepository;

/// 应用状态
///
/// 包含API实例和共享资源（单一共享连接）
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 导入API
    pub import_api: Arc<ImportApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 成功创建
    /// - Err(String): 初始化失败
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 创建数据库连接（共享连接）并建表
        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        run_migrations(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 配置 / 引擎 / 仓储
        // ==========================================
        let config_manager = ConfigManager::from_connection(conn.clone())
            .map_err(|e| format!("无法创建ConfigManager: {}", e))?;
        let engine = ImportEngine::from_config_reader(conn.clone(), &config_manager)
            .map_err(|e| format!("无法创建ImportEngine: {}", e))?;
        tracing::info!(
            locale = %engine.config().locale,
            max_batch_rows = engine.config().max_batch_rows,
            "导入引擎初始化完成"
        );

        let batch_log_repo = Arc::new(ImportBatchLogRepository::new(conn));
        let import_api = Arc::new(ImportApi::new(Arc::new(engine), batch_log_repo));

        Ok(Self {
            db_path,
            import_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先使用环境变量 `HR_IMPORT_DB_PATH`，否则使用用户数据目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("HR_IMPORT_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./hr_import.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("hr-import");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("hr_import.db");
        }
    }

    path.to_string_lossy().to_string()
}
