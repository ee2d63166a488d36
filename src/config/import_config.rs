// ==========================================
// 人力资源管理后台 - 导入配置
// ==========================================
// 职责: 导入引擎的配置快照与读取接口（不包含实现）
// 实现者: ConfigManager（从 config_kv 表读取）
// ==========================================

use crate::events::DEFAULT_EVENT_NAMESPACE;
use crate::i18n::DEFAULT_LOCALE;
use crate::importer::entity_resolver::DEFAULT_FULL_SCAN_LIMIT;
use serde::{Deserialize, Serialize};
use std::error::Error;

/// 单批次默认最大行数
pub const DEFAULT_MAX_BATCH_ROWS: usize = 5_000;

// ==========================================
// ImportConfig - 配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// 人员解析全表扫描的行数上限
    pub resolver_full_scan_limit: i64,
    /// 单批次最大行数
    pub max_batch_rows: usize,
    /// 用户可见消息语言
    pub locale: String,
    /// 领域事件命名空间
    pub event_namespace: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            resolver_full_scan_limit: DEFAULT_FULL_SCAN_LIMIT,
            max_batch_rows: DEFAULT_MAX_BATCH_ROWS,
            locale: DEFAULT_LOCALE.to_string(),
            event_namespace: DEFAULT_EVENT_NAMESPACE.to_string(),
        }
    }
}

// ==========================================
// ImportConfigReader Trait
// ==========================================
pub trait ImportConfigReader: Send + Sync {
    /// 读取导入配置（缺失项使用默认值）
    fn load_import_config(&self) -> Result<ImportConfig, Box<dyn Error>>;
}
