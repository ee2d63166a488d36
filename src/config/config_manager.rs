// ==========================================
// 人力资源管理后台 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config::{ImportConfig, ImportConfigReader};
use crate::db::open_sqlite_connection;
use crate::i18n;
use crate::importer::error::ImportError;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有 global 配置
    pub fn get_config_snapshot(&self) -> Result<HashMap<String, String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut config_map = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(config_map)
    }

    /// 读取并解析数值配置；值存在但无法解析时报错
    fn get_parsed<T: FromStr>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T::Err: std::fmt::Display,
    {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<T>().map_err(|e| {
                Box::new(ImportError::ConfigValueError {
                    key: key.to_string(),
                    value: raw.clone(),
                    message: e.to_string(),
                }) as Box<dyn Error>
            }),
        }
    }
}

impl ImportConfigReader for ConfigManager {
    fn load_import_config(&self) -> Result<ImportConfig, Box<dyn Error>> {
        let defaults = ImportConfig::default();

        let resolver_full_scan_limit = self.get_parsed(
            config_keys::RESOLVER_FULL_SCAN_LIMIT,
            defaults.resolver_full_scan_limit,
        )?;
        let max_batch_rows = self.get_parsed(config_keys::MAX_BATCH_ROWS, defaults.max_batch_rows)?;

        // 不支持的语言回退到默认语言
        let locale = self
            .get_config_value(config_keys::DEFAULT_LOCALE)?
            .map(|v| v.trim().to_string())
            .filter(|v| i18n::is_supported(v))
            .unwrap_or(defaults.locale);

        let event_namespace = self
            .get_config_value(config_keys::EVENT_NAMESPACE)?
            .map(|v| v.trim().trim_end_matches('\\').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.event_namespace);

        Ok(ImportConfig {
            resolver_full_scan_limit,
            max_batch_rows,
            locale,
            event_namespace,
        })
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // ===== 导入引擎 =====
    pub const RESOLVER_FULL_SCAN_LIMIT: &str = "import.resolver_full_scan_limit";
    pub const MAX_BATCH_ROWS: &str = "import.max_batch_rows";
    pub const DEFAULT_LOCALE: &str = "import.default_locale";
    pub const EVENT_NAMESPACE: &str = "import.event_namespace";
}
