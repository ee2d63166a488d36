// ==========================================
// 人力资源管理后台 - 配置层
// ==========================================
// 职责: 导入引擎配置管理
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod import_config;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use import_config::{ImportConfig, ImportConfigReader, DEFAULT_MAX_BATCH_ROWS};
