// ==========================================
// 人力资源管理后台 - 领域事件
// ==========================================
// 职责: 提交成功后按记录派发 created / updated 领域事件
// 说明: 事件注册表为编译期常量表 (实体, 动作) -> 构造函数；
//      未注册的组合与派发失败都不影响导入结果
// ==========================================
// 命名: "{namespace}\{Clase}\{Clase}{Sufijo}"，如 App\Events\Empleado\EmpleadoCreated
// ==========================================

use crate::domain::types::{EntityKind, ImportAction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;

/// 默认事件命名空间
pub const DEFAULT_EVENT_NAMESPACE: &str = "App\\Events";

// ==========================================
// DomainEvent
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// 完整事件名
    pub name: String,
    pub entity: EntityKind,
    pub action: ImportAction,
    pub entity_id: i64,
    pub display: String,
    /// 导入操作人
    pub actor: String,
    pub batch_id: String,
    pub occurred_at: DateTime<Utc>,
}

/// 构造事件所需的上下文
#[derive(Debug, Clone)]
pub struct EventContext<'a> {
    pub namespace: &'a str,
    pub entity_id: i64,
    pub display: &'a str,
    pub actor: &'a str,
    pub batch_id: &'a str,
}

/// 事件名
pub fn event_name(namespace: &str, entity: EntityKind, action: ImportAction) -> String {
    let class = entity.class_name();
    format!("{}\\{}\\{}{}", namespace, class, class, action.event_suffix())
}

fn build(entity: EntityKind, action: ImportAction, ctx: &EventContext<'_>) -> DomainEvent {
    DomainEvent {
        name: event_name(ctx.namespace, entity, action),
        entity,
        action,
        entity_id: ctx.entity_id,
        display: ctx.display.to_string(),
        actor: ctx.actor.to_string(),
        batch_id: ctx.batch_id.to_string(),
        occurred_at: Utc::now(),
    }
}

/// 事件构造函数
pub type EventConstructor = fn(&EventContext<'_>) -> DomainEvent;

macro_rules! event_constructor {
    ($fn_name:ident, $entity:expr, $action:expr) => {
        fn $fn_name(ctx: &EventContext<'_>) -> DomainEvent {
            build($entity, $action, ctx)
        }
    };
}

event_constructor!(empleado_created, EntityKind::Empleado, ImportAction::Created);
event_constructor!(empleado_updated, EntityKind::Empleado, ImportAction::Updated);
event_constructor!(empresa_created, EntityKind::Empresa, ImportAction::Created);
event_constructor!(empresa_updated, EntityKind::Empresa, ImportAction::Updated);
event_constructor!(departamento_created, EntityKind::Departamento, ImportAction::Created);
event_constructor!(contrato_created, EntityKind::Contrato, ImportAction::Created);
event_constructor!(contrato_updated, EntityKind::Contrato, ImportAction::Updated);
event_constructor!(asignacion_created, EntityKind::Asignacion, ImportAction::Created);
event_constructor!(usuario_created, EntityKind::Usuario, ImportAction::Created);
event_constructor!(usuario_updated, EntityKind::Usuario, ImportAction::Updated);
event_constructor!(proyecto_created, EntityKind::Proyecto, ImportAction::Created);

/// 编译期事件注册表
///
/// 只有存在自然键（可 upsert）的实体注册 updated 事件
pub const EVENT_REGISTRY: &[(EntityKind, ImportAction, EventConstructor)] = &[
    (EntityKind::Empleado, ImportAction::Created, empleado_created),
    (EntityKind::Empleado, ImportAction::Updated, empleado_updated),
    (EntityKind::Empresa, ImportAction::Created, empresa_created),
    (EntityKind::Empresa, ImportAction::Updated, empresa_updated),
    (EntityKind::Departamento, ImportAction::Created, departamento_created),
    (EntityKind::Contrato, ImportAction::Created, contrato_created),
    (EntityKind::Contrato, ImportAction::Updated, contrato_updated),
    (EntityKind::Asignacion, ImportAction::Created, asignacion_created),
    (EntityKind::Usuario, ImportAction::Created, usuario_created),
    (EntityKind::Usuario, ImportAction::Updated, usuario_updated),
    (EntityKind::Proyecto, ImportAction::Created, proyecto_created),
];

/// 查找构造函数
pub fn lookup(entity: EntityKind, action: ImportAction) -> Option<EventConstructor> {
    EVENT_REGISTRY
        .iter()
        .find(|(e, a, _)| *e == entity && *a == action)
        .map(|(_, _, ctor)| *ctor)
}

// ==========================================
// 事件派发 Trait
// ==========================================

/// 事件派发者（外部事件总线的适配点）
pub trait EventDispatcher: Send + Sync {
    fn dispatch(&self, event: &DomainEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作派发者
///
/// 用于不需要事件派发的场景（如单元测试 / CLI）
#[derive(Debug, Clone, Default)]
pub struct NoOpEventDispatcher;

impl EventDispatcher for NoOpEventDispatcher {
    fn dispatch(&self, _event: &DomainEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

// ==========================================
// EventNotifier
// ==========================================

/// 单条事件的派发结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Dispatched(String),
    Unregistered(String),
    Failed { name: String, error: String },
}

pub struct EventNotifier {
    namespace: String,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl EventNotifier {
    pub fn new(namespace: impl Into<String>, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        Self {
            namespace: namespace.into(),
            dispatcher,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// 构造并派发一条事件；错误只体现在返回值中，从不向上传播
    pub fn notify(
        &self,
        entity: EntityKind,
        action: ImportAction,
        entity_id: i64,
        display: &str,
        actor: &str,
        batch_id: &str,
    ) -> NotifyOutcome {
        let ctor = match lookup(entity, action) {
            Some(ctor) => ctor,
            None => return NotifyOutcome::Unregistered(event_name(&self.namespace, entity, action)),
        };

        let event = ctor(&EventContext {
            namespace: &self.namespace,
            entity_id,
            display,
            actor,
            batch_id,
        });

        match self.dispatcher.dispatch(&event) {
            Ok(()) => NotifyOutcome::Dispatched(event.name),
            Err(e) => NotifyOutcome::Failed {
                name: event.name,
                error: e.to_string(),
            },
        }
    }
}

impl Default for EventNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_NAMESPACE, Arc::new(NoOpEventDispatcher))
    }
}
