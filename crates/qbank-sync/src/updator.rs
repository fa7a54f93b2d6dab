//! The "question updator": rebuild an aggregate from committed state and push
//! it to the cache and the search index.
//!
//! Runs strictly after the DB transaction commits. Builder errors abort the
//! pipeline; cache and search failures are logged and reported, never fatal,
//! except a search failure under [`SearchFailurePolicy::Propagate`].

use std::sync::Arc;

use qbank_cache::CacheSynchronizer;
use qbank_core::aggregate::QuestionDetail;
use qbank_core::completion::is_complete;
use qbank_core::enums::CompletionStatus;
use qbank_db::QuestionDb;
use qbank_search::{SearchFailurePolicy, SearchSynchronizer};
use serde::Serialize;
use uuid::Uuid;

use crate::error::SyncError;
use crate::health::BackendHealth;

/// Result of one cache or search step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Written,
    /// Backend disabled by config or marked unusable by the health view.
    Skipped,
    /// Attempted and failed; the error was logged.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub question_id: Uuid,
    pub version: i64,
    pub status: CompletionStatus,
    pub cache: StepOutcome,
    /// Key written when `cache` is `Written`.
    pub cache_key: Option<String>,
    pub search: StepOutcome,
}

/// A published aggregate and how each projection fared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub detail: QuestionDetail,
    pub report: SyncReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetractReport {
    pub cache: StepOutcome,
    pub search: StepOutcome,
}

/// Builder → Evaluator → Cache → Search, sequential per call.
#[derive(Clone)]
pub struct QuestionUpdator {
    db: Arc<QuestionDb>,
    cache: Option<CacheSynchronizer>,
    search: Option<SearchSynchronizer>,
    health: Arc<dyn BackendHealth>,
}

impl QuestionUpdator {
    pub fn new(
        db: Arc<QuestionDb>,
        cache: Option<CacheSynchronizer>,
        search: Option<SearchSynchronizer>,
        health: Arc<dyn BackendHealth>,
    ) -> Self {
        Self {
            db,
            cache,
            search,
            health,
        }
    }

    /// The cache synchronizer, if configured and currently usable.
    pub fn usable_cache(&self) -> Option<&CacheSynchronizer> {
        self.cache.as_ref().filter(|_| self.health.is_cache_usable())
    }

    /// The search synchronizer, if configured and currently usable.
    pub fn usable_search(&self) -> Option<&SearchSynchronizer> {
        self.search.as_ref().filter(|_| self.health.is_search_usable())
    }

    /// Rebuild `id` and refresh both projections, absorbing projection failures.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Database` if the aggregate cannot be rebuilt
    /// (missing question, unknown type, malformed rows).
    pub async fn update_cache_and_search(&self, id: Uuid) -> Result<SyncReport, SyncError> {
        Ok(self.publish(id, SearchFailurePolicy::Absorb).await?.report)
    }

    /// Same pipeline as [`Self::update_cache_and_search`] for a newly created
    /// question, with the search failure handled by `policy`.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Database` on rebuild failure and `SyncError::Search`
    /// if the search write fails under `SearchFailurePolicy::Propagate`.
    pub async fn publish_created(
        &self,
        id: Uuid,
        policy: SearchFailurePolicy,
    ) -> Result<Published, SyncError> {
        self.publish(id, policy).await
    }

    /// Rebuild, evaluate, cache, index.
    ///
    /// # Errors
    ///
    /// See [`Self::publish_created`].
    pub async fn publish(
        &self,
        id: Uuid,
        policy: SearchFailurePolicy,
    ) -> Result<Published, SyncError> {
        let detail = self.db.load_detail(id).await?;
        let complete = is_complete(&detail);
        let status = CompletionStatus::from_flag(complete);
        tracing::debug!(question_id = %id, version = detail.version(), %status, "aggregate rebuilt");

        let (cache, cache_key) = self.write_cache(&detail, complete).await;

        let search = match self.usable_search() {
            None => StepOutcome::Skipped,
            Some(search) => {
                if policy.handle(id, search.upsert(&detail, status).await)? {
                    StepOutcome::Written
                } else {
                    StepOutcome::Failed
                }
            }
        };

        let report = SyncReport {
            question_id: id,
            version: detail.version(),
            status,
            cache,
            cache_key,
            search,
        };
        Ok(Published { detail, report })
    }

    /// Best-effort cache write of an already rebuilt aggregate.
    pub async fn write_cache(
        &self,
        detail: &QuestionDetail,
        complete: bool,
    ) -> (StepOutcome, Option<String>) {
        let Some(cache) = self.usable_cache() else {
            return (StepOutcome::Skipped, None);
        };
        match cache.sync(detail, complete).await {
            Ok(key) => (StepOutcome::Written, Some(key)),
            Err(e) => {
                tracing::warn!(question_id = %detail.id(), error = %e, "cache write failed, continuing");
                (StepOutcome::Failed, None)
            }
        }
    }

    /// Remove every cache entry and the search document of a deleted question.
    pub async fn retract(&self, id: Uuid) -> RetractReport {
        let cache = match self.usable_cache() {
            None => StepOutcome::Skipped,
            Some(cache) => match cache.invalidate(id).await {
                Ok(_) => StepOutcome::Written,
                Err(e) => {
                    tracing::warn!(question_id = %id, error = %e, "cache invalidation failed");
                    StepOutcome::Failed
                }
            },
        };
        let search = match self.usable_search() {
            None => StepOutcome::Skipped,
            Some(search) => match search.delete(id).await {
                Ok(_) => StepOutcome::Written,
                Err(e) => {
                    tracing::warn!(question_id = %id, error = %e, "search delete failed");
                    StepOutcome::Failed
                }
            },
        };
        RetractReport { cache, search }
    }
}
