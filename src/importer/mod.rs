// ==========================================
// 人力资源管理后台 - 导入层
// ==========================================
// 职责: 基于声明式 Schema 的批量导入（全有或全无）
// 组成: 字段校验 / 查重 / 引用解析 / 记录处理 / 错误翻译 / 引擎编排
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod duplicate_detector;
pub mod entity_resolver;
pub mod error;
pub mod error_translator;
pub mod field_validator;
pub mod import_engine;
pub mod observer;
pub mod processors;

// 重导出核心类型
pub use data_cleaner::DataCleaner;
pub use duplicate_detector::{BatchClaims, DuplicateDetector};
pub use entity_resolver::{EntityResolver, ResolveError, ResolveResult};
pub use error::{ImportError, ImportResult};
pub use error_translator::ErrorTranslator;
pub use field_validator::FieldValidator;
pub use import_engine::ImportEngine;
pub use observer::{ImportObserver, NoOpObserver, TracingObserver};
pub use processors::{ProcessorRegistry, RecordProcessor};
