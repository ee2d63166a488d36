// ==========================================
// 人力资源管理后台 - 领域类型定义
// ==========================================
// 职责: 导入引擎共用的枚举类型（实体类型/字段类型/动作/错误类型/批次状态）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 实体类型 (Entity Kind)
// ==========================================
// 序列化格式: 复数 slug（与外部调用方约定一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    #[serde(rename = "empleados")]
    Empleado,
    #[serde(rename = "empresas")]
    Empresa,
    #[serde(rename = "departamentos")]
    Departamento,
    #[serde(rename = "contratos")]
    Contrato,
    #[serde(rename = "asignaciones")]
    Asignacion,
    #[serde(rename = "usuarios")]
    Usuario,
    #[serde(rename = "proyectos")]
    Proyecto,
}

impl EntityKind {
    /// 全部可导入实体
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Empleado,
        EntityKind::Empresa,
        EntityKind::Departamento,
        EntityKind::Contrato,
        EntityKind::Asignacion,
        EntityKind::Usuario,
        EntityKind::Proyecto,
    ];

    /// 外部 slug
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Empleado => "empleados",
            EntityKind::Empresa => "empresas",
            EntityKind::Departamento => "departamentos",
            EntityKind::Contrato => "contratos",
            EntityKind::Asignacion => "asignaciones",
            EntityKind::Usuario => "usuarios",
            EntityKind::Proyecto => "proyectos",
        }
    }

    /// 从 slug 解析（大小写不敏感）
    pub fn from_slug(slug: &str) -> Option<Self> {
        let slug = slug.trim().to_lowercase();
        EntityKind::ALL.into_iter().find(|k| k.as_str() == slug)
    }

    /// 存储表名（与 slug 相同）
    pub fn table(&self) -> &'static str {
        self.as_str()
    }

    /// 实体类名（事件命名使用）
    pub fn class_name(&self) -> &'static str {
        match self {
            EntityKind::Empleado => "Empleado",
            EntityKind::Empresa => "Empresa",
            EntityKind::Departamento => "Departamento",
            EntityKind::Contrato => "Contrato",
            EntityKind::Asignacion => "Asignacion",
            EntityKind::Usuario => "Usuario",
            EntityKind::Proyecto => "Proyecto",
        }
    }

    /// 用户可见名称的 i18n key
    pub fn message_key(&self) -> &'static str {
        match self {
            EntityKind::Empleado => "entities.empleado",
            EntityKind::Empresa => "entities.empresa",
            EntityKind::Departamento => "entities.departamento",
            EntityKind::Contrato => "entities.contrato",
            EntityKind::Asignacion => "entities.asignacion",
            EntityKind::Usuario => "entities.usuario",
            EntityKind::Proyecto => "entities.proyecto",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 字段类型 (Field Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,  // 单行文本
    Text,    // 长文本
    Email,   // 邮箱
    Date,    // 日期
    Boolean, // 是/否
    Select,  // 枚举
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Text => write!(f, "text"),
            FieldType::Email => write!(f, "email"),
            FieldType::Date => write!(f, "date"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::Select => write!(f, "select"),
        }
    }
}

// ==========================================
// 字段落库方式 (Field Storage)
// ==========================================
// Column: 规范化后直接写入同名（或指定）列
// Reference: 自由文本引用，由 EntityResolver 解析为外键 id
// Dependent: 隐含创建依赖实体（如地址），新 id 写回外键列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldStorage {
    #[default]
    Column,
    Reference,
    Dependent,
}

// ==========================================
// 落库动作 (Import Action)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportAction {
    Created,
    Updated,
}

impl ImportAction {
    /// 事件类名后缀
    pub fn event_suffix(&self) -> &'static str {
        match self {
            ImportAction::Created => "Created",
            ImportAction::Updated => "Updated",
        }
    }
}

impl fmt::Display for ImportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportAction::Created => write!(f, "created"),
            ImportAction::Updated => write!(f, "updated"),
        }
    }
}

// ==========================================
// 行错误类型 (Import Error Type)
// ==========================================
// duplicate: 查重阶段
// validation: 字段校验阶段
// processing: 记录处理阶段（引用解析/业务规则/意外错误）
// database_error: 提交阶段（整体回滚）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportErrorType {
    Duplicate,
    Validation,
    Processing,
    DatabaseError,
}

impl fmt::Display for ImportErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportErrorType::Duplicate => write!(f, "duplicate"),
            ImportErrorType::Validation => write!(f, "validation"),
            ImportErrorType::Processing => write!(f, "processing"),
            ImportErrorType::DatabaseError => write!(f, "database_error"),
        }
    }
}

// ==========================================
// 批次状态 (Batch State)
// ==========================================
// START → VALIDATING → (ALL_VALID → COMMITTING → COMMITTED | ROLLED_BACK)
//                    | (ANY_INVALID → REJECTED)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchState {
    Start,
    Validating,
    AllValid,
    AnyInvalid,
    Committing,
    Committed,
    Rejected,
    RolledBack,
}

impl BatchState {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchState::Committed | BatchState::Rejected | BatchState::RolledBack
        )
    }

    /// 合法的状态迁移
    pub fn can_transition_to(&self, next: BatchState) -> bool {
        use BatchState::*;
        matches!(
            (self, next),
            (Start, Validating)
                | (Start, Rejected)
                | (Validating, AllValid)
                | (Validating, AnyInvalid)
                | (AllValid, Committing)
                | (AnyInvalid, Rejected)
                | (Committing, Committed)
                | (Committing, RolledBack)
        )
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BatchState::Start => "START",
            BatchState::Validating => "VALIDATING",
            BatchState::AllValid => "ALL_VALID",
            BatchState::AnyInvalid => "ANY_INVALID",
            BatchState::Committing => "COMMITTING",
            BatchState::Committed => "COMMITTED",
            BatchState::Rejected => "REJECTED",
            BatchState::RolledBack => "ROLLED_BACK",
        };
        write!(f, "{}", s)
    }
}
