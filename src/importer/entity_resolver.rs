// ==========================================
// 人力资源管理后台 - 引用解析器
// ==========================================
// 职责: 将自由文本引用（姓名 / 税号 / 名称 / 邮箱）解析为已有实体 id
// ==========================================
// 人员分层匹配（首个产生候选的层级决定结果）:
//   1. 规范全名精确匹配（大小写敏感）
//   2. 子串匹配（Unicode 大小写不敏感，双向）
//   3. 分词匹配（首词 ⊂ 名字，其余各词 ⊂ 第一或第二姓氏）
//   4. 全表扫描（仅当行数 < full_scan_limit）：不敏感精确，再不敏感子串
// 某层级命中多条时返回 AmbiguousReference，不做任意挑选
// 结果在批次内缓存，保证同一文本解析结果一致
// ==========================================

use crate::domain::types::EntityKind;
use crate::i18n::Messages;
use crate::importer::data_cleaner::DataCleaner;
use crate::repository::error::RepositoryError;
use crate::repository::import_repo::{PersonCandidate, RecordStore};
use std::collections::HashMap;
use thiserror::Error;

/// 全表扫描兜底的默认行数上限
pub const DEFAULT_FULL_SCAN_LIMIT: i64 = 500;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("未找到引用实体 ({entity}): {text}")]
    NotFound { text: String, entity: EntityKind },

    #[error("引用不唯一 ({entity}): {text} 命中 {} 条", .candidates.len())]
    AmbiguousReference {
        text: String,
        entity: EntityKind,
        candidates: Vec<i64>,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ResolveError {
    /// 面向用户的字段级消息
    pub fn user_message(&self, messages: &Messages, label: &str) -> String {
        match self {
            ResolveError::NotFound { text, entity } => messages.text_with(
                "resolve.not_found",
                &[
                    ("label", label),
                    ("entity", &messages.text(entity.message_key())),
                    ("text", text),
                ],
            ),
            ResolveError::AmbiguousReference {
                text,
                entity,
                candidates,
            } => messages.text_with(
                "resolve.ambiguous",
                &[
                    ("label", label),
                    ("text", text),
                    ("count", &candidates.len().to_string()),
                    ("entity", &messages.text(entity.message_key())),
                ],
            ),
            ResolveError::Repository(_) => messages.text("processing.unexpected"),
        }
    }
}

pub type ResolveResult = Result<i64, ResolveError>;

/// 空白折叠
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 层级裁决: 0 条继续下一层；1 条命中；多条不唯一
fn decide(text: &str, entity: EntityKind, ids: Vec<i64>) -> Option<ResolveResult> {
    match ids.len() {
        0 => None,
        1 => Some(Ok(ids[0])),
        _ => Some(Err(ResolveError::AmbiguousReference {
            text: text.to_string(),
            entity,
            candidates: ids,
        })),
    }
}

fn ids_where<F>(candidates: &[PersonCandidate], pred: F) -> Vec<i64>
where
    F: Fn(&PersonCandidate) -> bool,
{
    candidates.iter().filter(|c| pred(c)).map(|c| c.id).collect()
}

fn substring_either_way(canonical_lower: &str, input_lower: &str) -> bool {
    !canonical_lower.is_empty()
        && (canonical_lower.contains(input_lower) || input_lower.contains(canonical_lower))
}

// ==========================================
// EntityResolver
// ==========================================
pub struct EntityResolver {
    full_scan_limit: i64,
    cleaner: DataCleaner,
    cache: HashMap<(EntityKind, &'static str, String), ResolveResult>,
}

impl EntityResolver {
    pub fn new(full_scan_limit: i64) -> Self {
        Self {
            full_scan_limit,
            cleaner: DataCleaner,
            cache: HashMap::new(),
        }
    }

    /// 按姓名解析人员（empleados）
    pub fn resolve_person(&mut self, store: &RecordStore<'_>, text: &str) -> ResolveResult {
        let input = collapse_whitespace(text);
        self.cached(EntityKind::Empleado, "person", input, |this, input| {
            this.resolve_person_uncached(store, input)
        })
    }

    /// 解析员工: NIF/NIE 形态按税号、含 @ 按邮箱，否则按姓名
    pub fn resolve_employee(&mut self, store: &RecordStore<'_>, text: &str) -> ResolveResult {
        let trimmed = text.trim();
        if self.cleaner.looks_like_nif(trimmed) {
            let nif = self.cleaner.clean_tax_id(trimmed);
            return self.cached(EntityKind::Empleado, "nif", nif, |_, nif| {
                let id = store.find_id_by("empleados", "nif", nif)?;
                id.ok_or_else(|| ResolveError::NotFound {
                    text: nif.to_string(),
                    entity: EntityKind::Empleado,
                })
            });
        }

        if trimmed.contains('@') {
            let email = self.cleaner.clean_email(trimmed);
            return self.cached(EntityKind::Empleado, "email", email, |_, email| {
                let id = store.find_id_by("empleados", "email", email)?;
                id.ok_or_else(|| ResolveError::NotFound {
                    text: email.to_string(),
                    entity: EntityKind::Empleado,
                })
            });
        }

        self.resolve_person(store, trimmed)
    }

    /// 解析公司: CIF 形态按税号，否则按名称（不敏感精确）
    pub fn resolve_company(&mut self, store: &RecordStore<'_>, text: &str) -> ResolveResult {
        let trimmed = text.trim();
        if self.cleaner.looks_like_cif(trimmed) {
            let cif = self.cleaner.clean_tax_id(trimmed);
            return self.cached(EntityKind::Empresa, "cif", cif, |_, cif| {
                let id = store.find_id_by("empresas", "cif", cif)?;
                id.ok_or_else(|| ResolveError::NotFound {
                    text: cif.to_string(),
                    entity: EntityKind::Empresa,
                })
            });
        }

        self.resolve_by_name(store, EntityKind::Empresa, trimmed)
    }

    /// 解析部门（按名称，不敏感精确）
    pub fn resolve_department(&mut self, store: &RecordStore<'_>, text: &str) -> ResolveResult {
        self.resolve_by_name(store, EntityKind::Departamento, text.trim())
    }

    fn resolve_by_name(&mut self, store: &RecordStore<'_>, entity: EntityKind, text: &str) -> ResolveResult {
        let input = collapse_whitespace(text);
        self.cached(entity, "name", input, |_, input| {
            let ids = store.find_ids_nocase(entity.table(), "nombre", input)?;
            decide(input, entity, ids).unwrap_or_else(|| {
                Err(ResolveError::NotFound {
                    text: input.to_string(),
                    entity,
                })
            })
        })
    }

    /// 缓存包装（仓储错误不缓存）
    fn cached<F>(&mut self, entity: EntityKind, strategy: &'static str, key: String, f: F) -> ResolveResult
    where
        F: FnOnce(&Self, &str) -> ResolveResult,
    {
        let cache_key = (entity, strategy, key);
        if let Some(hit) = self.cache.get(&cache_key) {
            return hit.clone();
        }

        let result = f(self, &cache_key.2);
        if !matches!(result, Err(ResolveError::Repository(_))) {
            self.cache.insert(cache_key, result.clone());
        }
        result
    }

    fn resolve_person_uncached(&self, store: &RecordStore<'_>, input: &str) -> ResolveResult {
        let entity = EntityKind::Empleado;
        let not_found = || ResolveError::NotFound {
            text: input.to_string(),
            entity,
        };
        if input.is_empty() {
            return Err(not_found());
        }
        let input_lower = input.to_lowercase();

        // 第 1、2 层共用前置过滤结果
        let prefiltered = store.person_candidates_for_text(input)?;

        let exact = ids_where(&prefiltered, |c| c.canonical_name() == input);
        if let Some(result) = decide(input, entity, exact) {
            return result;
        }

        let partial = ids_where(&prefiltered, |c| {
            substring_either_way(&c.canonical_name().to_lowercase(), &input_lower)
        });
        if let Some(result) = decide(input, entity, partial) {
            return result;
        }

        // 第 3 层: 分词
        let tokens: Vec<String> = input_lower.split_whitespace().map(String::from).collect();
        if tokens.len() >= 2 {
            let given = store.person_candidates_by_given_name(&tokens[0])?;
            let tokenized = ids_where(&given, |c| {
                let nombre = c.nombre.to_lowercase();
                let primer = c.primer_apellido.to_lowercase();
                let segundo = c.segundo_apellido.as_deref().unwrap_or_default().to_lowercase();
                nombre.contains(tokens[0].as_str())
                    && tokens[1..].iter().all(|t| {
                        primer.contains(t.as_str()) || (!segundo.is_empty() && segundo.contains(t.as_str()))
                    })
            });
            if let Some(result) = decide(input, entity, tokenized) {
                return result;
            }
        }

        // 第 4 层: 有界全表扫描
        if store.count(entity.table())? < self.full_scan_limit {
            let all = store.all_persons()?;
            let exact_ci = ids_where(&all, |c| c.canonical_name().to_lowercase() == input_lower);
            if let Some(result) = decide(input, entity, exact_ci) {
                return result;
            }

            let partial_ci = ids_where(&all, |c| {
                substring_either_way(&c.canonical_name().to_lowercase(), &input_lower)
            });
            if let Some(result) = decide(input, entity, partial_ci) {
                return result;
            }
        }

        Err(not_found())
    }
}

impl Default for EntityResolver {
    fn default() -> Self {
        Self::new(DEFAULT_FULL_SCAN_LIMIT)
    }
}
