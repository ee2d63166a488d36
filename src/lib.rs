// ==========================================
// 人力资源管理后台 - 批量导入核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 基于声明式 Schema 的批量导入（全有或全无）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "es");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - Schema、行与批次结果
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 校验、解析、编排
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// 领域事件
pub mod events;

// API 层 - 异步接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    BatchState, EntityKind, FieldSpec, FieldType, ImportAction, ImportBatchResult,
    ImportErrorType, ImportSchema, InvalidRow, RawRow, TemplateData, ValidationResult,
};

// 导入引擎
pub use importer::{ImportEngine, ImportError, ImportObserver, ImportResult};

// 配置
pub use config::{ConfigManager, ImportConfig};

// 事件
pub use events::{DomainEvent, EventDispatcher};

// API
pub use api::ImportApi;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "人力资源管理后台 - 批量导入";
