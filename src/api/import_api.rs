// ==========================================
// 人力资源管理后台 - 导入API
// ==========================================
// 职责: 导入引擎的异步封装（Schema / 模板 / 批次导入 / 批次审计）
// 说明: 引擎是同步的，所有调用通过 spawn_blocking 执行
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::import_result::ImportBatchResult;
use crate::domain::row::RawRow;
use crate::domain::schema::{ImportSchema, TemplateData};
use crate::importer::ImportEngine;
use crate::repository::import_log_repo::{ImportBatchLog, ImportBatchLogRepository};
use std::sync::Arc;

/// 批次审计列表的最大条数
const MAX_BATCH_LIST_LIMIT: usize = 200;

/// 导入API
pub struct ImportApi {
    engine: Arc<ImportEngine>,
    batch_log_repo: Arc<ImportBatchLogRepository>,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(engine: Arc<ImportEngine>, batch_log_repo: Arc<ImportBatchLogRepository>) -> Self {
        Self {
            engine,
            batch_log_repo,
        }
    }

    /// 在阻塞线程池上执行同步调用
    async fn run_blocking<T, F>(&self, f: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&ImportEngine) -> ApiResult<T> + Send + 'static,
    {
        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || f(&engine))
            .await
            .map_err(|e| ApiError::InternalError(format!("导入任务执行失败: {}", e)))?
    }

    /// 获取实体的导入 Schema
    pub async fn get_schema(&self, entity: &str) -> ApiResult<ImportSchema> {
        let entity = entity.to_string();
        self.run_blocking(move |engine| Ok(engine.get_schema(&entity)?.clone()))
            .await
    }

    /// 获取实体的下载模板数据
    pub async fn get_template_data(&self, entity: &str) -> ApiResult<TemplateData> {
        let entity = entity.to_string();
        self.run_blocking(move |engine| Ok(engine.get_template_data(&entity)?))
            .await
    }

    /// 导入一个批次
    ///
    /// # 参数
    /// - entity: 实体 slug
    /// - rows: 已解析的行
    /// - actor: 导入人（不能为空）
    ///
    /// # 返回
    /// - Ok(ImportBatchResult): 批次结果（含行级错误）
    /// - Err(ApiError): 调用或引擎层面的错误
    pub async fn import(&self, entity: &str, rows: Vec<RawRow>, actor: &str) -> ApiResult<ImportBatchResult> {
        let actor = actor.trim().to_string();
        if actor.is_empty() {
            return Err(ApiError::InvalidInput("actor 不能为空".to_string()));
        }
        let entity = entity.to_string();

        self.run_blocking(move |engine| Ok(engine.import(&entity, rows, &actor)?))
            .await
    }

    /// 最近的导入批次（按导入时间倒序）
    pub async fn list_recent_batches(&self, limit: usize) -> ApiResult<Vec<ImportBatchLog>> {
        let limit = limit.clamp(1, MAX_BATCH_LIST_LIMIT);
        let repo = self.batch_log_repo.clone();

        tokio::task::spawn_blocking(move || repo.list_recent(limit))
            .await
            .map_err(|e| ApiError::InternalError(format!("查询任务执行失败: {}", e)))?
            .map_err(ApiError::from)
    }
}
