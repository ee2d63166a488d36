// ==========================================
// 人力资源管理后台 - 导入过程观察者
// ==========================================
// 职责: 导入管道的结构化日志注入点
// 说明: 管道只调用 ImportObserver；TracingObserver 输出 tracing 事件，
//      NoOpObserver 用于需要安静运行的测试
// ==========================================

use crate::domain::import_result::InvalidRow;
use crate::domain::types::{EntityKind, ImportAction};

/// 导入过程观察者（全部方法默认空实现）
pub trait ImportObserver: Send + Sync {
    /// 批次开始
    fn batch_started(&self, _batch_id: &str, _entity: EntityKind, _rows: usize, _actor: &str) {}

    /// 某行在第一阶段被拒绝
    fn row_rejected(&self, _batch_id: &str, _invalid: &InvalidRow) {}

    /// 第一阶段结束（此时未持有连接锁，也未开启事务）
    fn validation_finished(&self, _batch_id: &str, _valid: usize, _invalid: usize) {}

    /// 记录在事务内写入
    fn record_committed(&self, _batch_id: &str, _entity: EntityKind, _action: ImportAction, _id: i64) {}

    /// 批次提交成功
    fn batch_committed(&self, _batch_id: &str, _created: usize, _updated: usize, _elapsed_ms: u128) {}

    /// 批次被拒绝（第一阶段存在失败行，或批次级前置检查失败）
    fn batch_rejected(&self, _batch_id: &str, _invalid: usize) {}

    /// 提交阶段失败并回滚
    fn batch_rolled_back(&self, _batch_id: &str, _row: usize, _cause: &str) {}

    /// 领域事件未派发（未注册或派发失败）
    fn event_not_dispatched(&self, _batch_id: &str, _event: &str, _reason: &str) {}

    /// 批次审计写入失败
    fn audit_failed(&self, _batch_id: &str, _error: &str) {}
}

/// 基于 tracing 的观察者
#[derive(Debug, Clone, Default)]
pub struct TracingObserver;

impl ImportObserver for TracingObserver {
    fn batch_started(&self, batch_id: &str, entity: EntityKind, rows: usize, actor: &str) {
        tracing::info!(batch_id, entity = %entity, rows, actor, "导入批次开始");
    }

    fn row_rejected(&self, batch_id: &str, invalid: &InvalidRow) {
        tracing::debug!(
            batch_id,
            row = invalid.row,
            error_type = %invalid.error_type,
            fields = ?invalid.errors.fields,
            "行校验失败"
        );
    }

    fn validation_finished(&self, batch_id: &str, valid: usize, invalid: usize) {
        tracing::debug!(batch_id, valid, invalid, "校验阶段结束");
    }

    fn record_committed(&self, batch_id: &str, entity: EntityKind, action: ImportAction, id: i64) {
        tracing::debug!(batch_id, entity = %entity, action = %action, id, "记录已写入");
    }

    fn batch_committed(&self, batch_id: &str, created: usize, updated: usize, elapsed_ms: u128) {
        tracing::info!(batch_id, created, updated, elapsed_ms = elapsed_ms as u64, "导入批次已提交");
    }

    fn batch_rejected(&self, batch_id: &str, invalid: usize) {
        tracing::warn!(batch_id, invalid, "导入批次被拒绝，未写入任何数据");
    }

    fn batch_rolled_back(&self, batch_id: &str, row: usize, cause: &str) {
        tracing::warn!(batch_id, row, cause, "提交失败，批次已回滚");
    }

    fn event_not_dispatched(&self, batch_id: &str, event: &str, reason: &str) {
        tracing::warn!(batch_id, event, reason, "领域事件未派发");
    }

    fn audit_failed(&self, batch_id: &str, error: &str) {
        tracing::error!(batch_id, error, "批次审计写入失败");
    }
}

/// 空操作观察者
#[derive(Debug, Clone, Default)]
pub struct NoOpObserver;

impl ImportObserver for NoOpObserver {}
