// ==========================================
// 人力资源管理后台 - 领域模型层
// ==========================================
// 职责: 定义导入 Schema、原始行、中间载荷与批次结果
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod import_result;
pub mod row;
pub mod schema;
pub mod types;

// 重导出核心类型
pub use import_result::{EntitySummary, ImportBatchResult, InvalidRow};
pub use row::{DependentRecord, FieldValue, NaturalKey, ProcessedRecord, RawRow, ValidationResult};
pub use schema::{FieldSpec, ImportSchema, SchemaError, TemplateData, BOOLEAN_OPTIONS};
pub use types::{
    BatchState, EntityKind, FieldStorage, FieldType, ImportAction, ImportErrorType,
};
