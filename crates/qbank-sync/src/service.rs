//! `QuestionService`: every mutation entry point plus the read paths.
//!
//! Mutations commit in the store first, then run the updator outside the
//! transaction. Reads prefer the cache and repair it on miss.

use std::path::Path;
use std::sync::Arc;

use qbank_cache::{CacheSynchronizer, MemoryCache};
use qbank_config::{QbankConfig, SyncConfig};
use qbank_core::aggregate::{KnownVersion, QuestionDetail};
use qbank_core::completion::is_complete;
use qbank_core::entities::Question;
use qbank_core::enums::VariantKind;
use qbank_core::inputs::{NewQuestion, VariantInput, VariantRow};
use qbank_core::search::{SearchDocument, SearchFilter, SearchPage};
use qbank_db::QuestionDb;
use qbank_db::updates::question::QuestionUpdate;
use qbank_search::{LibsqlSearchIndex, SearchFailurePolicy, SearchSynchronizer};
use serde::Serialize;
use uuid::Uuid;

use crate::error::SyncError;
use crate::health::BackendHealth;
use crate::updator::{QuestionUpdator, RetractReport, StepOutcome, SyncReport};

/// A committed mutation and the aggregate as published afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub detail: QuestionDetail,
    pub report: SyncReport,
}

/// A committed child mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantMutation {
    pub row: VariantRow,
    pub detail: QuestionDetail,
    pub report: SyncReport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deletion {
    pub question: Question,
    pub report: RetractReport,
}

/// Outcome of [`QuestionService::reindex_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReindexReport {
    pub total: usize,
    /// Questions whose aggregate could not be rebuilt from the store.
    pub rebuild_failed: usize,
    pub failed_ids: Vec<Uuid>,
    pub cache_failed: usize,
    pub search_failed: usize,
}

pub struct QuestionService {
    db: Arc<QuestionDb>,
    updator: QuestionUpdator,
    sync: SyncConfig,
}

fn ensure_parent_dir(path: &str) -> Result<(), SyncError> {
    if path == ":memory:" {
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

impl QuestionService {
    pub fn new(db: Arc<QuestionDb>, updator: QuestionUpdator, sync: SyncConfig) -> Self {
        Self { db, updator, sync }
    }

    /// Open the store, the in-process cache, and the search index described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Config` for an invalid config, `SyncError::Io` if a
    /// data directory cannot be created, and database errors from opening the
    /// store or the index.
    pub async fn open(
        config: &QbankConfig,
        health: Arc<dyn BackendHealth>,
    ) -> Result<Self, SyncError> {
        config.validate()?;

        ensure_parent_dir(&config.database.path)?;
        let db = Arc::new(QuestionDb::open_local(&config.database.path).await?);

        let cache = config.cache.enabled.then(|| {
            CacheSynchronizer::from_config(Arc::new(MemoryCache::new()), &config.cache)
        });

        let search = if config.search.enabled {
            ensure_parent_dir(&config.search.path)?;
            let index = LibsqlSearchIndex::open_local(&config.search.path)
                .await?
                .with_page_sizes(config.search.default_page_size, config.search.max_page_size);
            Some(SearchSynchronizer::new(Arc::new(index)))
        } else {
            None
        };

        tracing::info!(
            database = %config.database.path,
            cache = config.cache.enabled,
            search = config.search.enabled,
            "question service opened"
        );
        let updator = QuestionUpdator::new(db.clone(), cache, search, health);
        Ok(Self::new(db, updator, config.sync.clone()))
    }

    pub fn db(&self) -> &Arc<QuestionDb> {
        &self.db
    }

    pub const fn updator(&self) -> &QuestionUpdator {
        &self.updator
    }

    // -----------------------------------------------------------------------
    // Parent mutations
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `Validation` for bad input, and the search error when indexing
    /// fails and `sync.propagate_search_failure_on_create` is set. The
    /// question stays committed in that case.
    pub async fn create_question(&self, input: NewQuestion) -> Result<Mutation, SyncError> {
        let question = self.db.create_question(input).await?;
        let policy = SearchFailurePolicy::on_create(self.sync.propagate_search_failure_on_create);
        let published = self.updator.publish_created(question.id, policy).await?;
        Ok(Mutation {
            detail: published.detail,
            report: published.report,
        })
    }

    /// # Errors
    ///
    /// Returns `Validation`, `NotFound`, or `Conflict` from the store.
    pub async fn update_question(
        &self,
        id: Uuid,
        update: &QuestionUpdate,
    ) -> Result<Mutation, SyncError> {
        self.db.update_question(id, update).await?;
        self.republish(id).await
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the question does not exist.
    pub async fn delete_question(&self, id: Uuid) -> Result<Deletion, SyncError> {
        let question = self.db.delete_question(id).await?;
        let report = self.updator.retract(id).await;
        Ok(Deletion { question, report })
    }

    // -----------------------------------------------------------------------
    // Child mutations
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `Validation`, `NotFound`, or `Conflict` from the store.
    pub async fn add_variant(
        &self,
        question_id: Uuid,
        input: VariantInput,
    ) -> Result<VariantMutation, SyncError> {
        let change = self
            .db
            .add_variant(question_id, input, self.sync.bump_version_on_child_change)
            .await?;
        self.republish_variant(change.row).await
    }

    /// # Errors
    ///
    /// Returns `Validation` or `NotFound` from the store.
    pub async fn update_variant(
        &self,
        kind: VariantKind,
        id: Uuid,
        input: VariantInput,
    ) -> Result<VariantMutation, SyncError> {
        let change = self
            .db
            .update_variant(kind, id, input, self.sync.bump_version_on_child_change)
            .await?;
        self.republish_variant(change.row).await
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the row does not exist.
    pub async fn delete_variant(
        &self,
        kind: VariantKind,
        id: Uuid,
    ) -> Result<VariantMutation, SyncError> {
        let change = self
            .db
            .delete_variant(kind, id, self.sync.bump_version_on_child_change)
            .await?;
        self.republish_variant(change.row).await
    }

    async fn republish(&self, id: Uuid) -> Result<Mutation, SyncError> {
        let published = self.updator.publish(id, SearchFailurePolicy::Absorb).await?;
        Ok(Mutation {
            detail: published.detail,
            report: published.report,
        })
    }

    async fn republish_variant(&self, row: VariantRow) -> Result<VariantMutation, SyncError> {
        let Mutation { detail, report } = self.republish(row.question_id()).await?;
        Ok(VariantMutation {
            row,
            detail,
            report,
        })
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Cache first; on miss or cache trouble rebuild from the store and
    /// repopulate the cache best-effort.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `UnknownType` from the store. Never fails because
    /// of the cache.
    pub async fn get_question(&self, id: Uuid) -> Result<QuestionDetail, SyncError> {
        if let Some(cache) = self.updator.usable_cache() {
            match cache.fetch(id).await {
                Ok(Some(detail)) => {
                    tracing::debug!(question_id = %id, "cache hit");
                    return Ok(detail);
                }
                Ok(None) => tracing::debug!(question_id = %id, "cache miss"),
                Err(e) => tracing::warn!(question_id = %id, error = %e, "cache read failed"),
            }
        }

        let detail = self.db.load_detail(id).await?;
        self.updator.write_cache(&detail, is_complete(&detail)).await;
        Ok(detail)
    }

    /// Aggregates whose stored version is strictly greater than the one the
    /// caller holds, most recently updated first.
    ///
    /// Pairs whose exact version is still cached are treated as up to date
    /// without touching the store.
    ///
    /// # Errors
    ///
    /// Returns store errors from the batched query or the rebuilds.
    pub async fn get_changed_since(
        &self,
        known: &[KnownVersion],
    ) -> Result<Vec<QuestionDetail>, SyncError> {
        let mut queued = Vec::with_capacity(known.len());
        match self.updator.usable_cache() {
            None => queued.extend_from_slice(known),
            Some(cache) => {
                for pair in known {
                    match cache.probe_version(pair.id, pair.version).await {
                        Ok(true) => {}
                        Ok(false) => queued.push(*pair),
                        Err(e) => {
                            tracing::warn!(question_id = %pair.id, error = %e, "cache probe failed");
                            queued.push(*pair);
                        }
                    }
                }
            }
        }
        tracing::debug!(known = known.len(), queued = queued.len(), "changed-since probe done");

        let details = self
            .db
            .details_changed_since(&queued, self.sync.changed_since_batch)
            .await?;
        for detail in &details {
            self.updator.write_cache(detail, is_complete(detail)).await;
        }
        Ok(details)
    }

    /// # Errors
    ///
    /// Returns `Unavailable` when search is disabled or unusable, and
    /// `Search` for an invalid filter or an index failure.
    pub async fn search(
        &self,
        filter: &SearchFilter,
    ) -> Result<SearchPage<SearchDocument>, SyncError> {
        let search = self
            .updator
            .usable_search()
            .ok_or(SyncError::Unavailable("search"))?;
        Ok(search.search(filter).await?)
    }

    /// Most recently updated parents first.
    ///
    /// # Errors
    ///
    /// Returns store errors.
    pub async fn list_questions(&self, limit: u32) -> Result<Vec<Question>, SyncError> {
        Ok(self.db.list_questions(limit).await?)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the row does not exist.
    pub async fn get_variant(&self, kind: VariantKind, id: Uuid) -> Result<VariantRow, SyncError> {
        Ok(self.db.get_variant(kind, id).await?)
    }

    /// # Errors
    ///
    /// Returns store errors.
    pub async fn list_variants(
        &self,
        question_id: Uuid,
        kind: VariantKind,
    ) -> Result<Vec<VariantRow>, SyncError> {
        Ok(self.db.list_variants(question_id, kind).await?)
    }

    /// Re-run the updator for every stored question.
    ///
    /// A question that cannot be rebuilt is logged, recorded in
    /// `failed_ids`, and skipped.
    ///
    /// # Errors
    ///
    /// Returns store errors from listing the question ids.
    pub async fn reindex_all(&self) -> Result<ReindexReport, SyncError> {
        let mut report = ReindexReport::default();
        for id in self.db.question_ids().await? {
            report.total += 1;
            match self.updator.update_cache_and_search(id).await {
                Ok(sync) => {
                    report.cache_failed += usize::from(sync.cache == StepOutcome::Failed);
                    report.search_failed += usize::from(sync.search == StepOutcome::Failed);
                }
                Err(e) => {
                    tracing::warn!(question_id = %id, error = %e, "reindex: rebuild failed");
                    report.rebuild_failed += 1;
                    report.failed_ids.push(id);
                }
            }
        }
        tracing::info!(
            total = report.total,
            rebuild_failed = report.rebuild_failed,
            cache_failed = report.cache_failed,
            search_failed = report.search_failed,
            "reindex complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use qbank_config::CacheKeyLayout;

    use super::*;
    use crate::health::HealthFlags;

    #[tokio::test]
    async fn open_creates_data_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = QbankConfig::default();
        config.database.path = dir.path().join("data/questions.db").display().to_string();
        config.search.path = dir.path().join("index/search.db").display().to_string();
        config.cache.key_layout = CacheKeyLayout::Versioned;

        let service = QuestionService::open(&config, Arc::new(HealthFlags::new()))
            .await
            .unwrap();
        assert!(dir.path().join("data").is_dir());
        assert!(dir.path().join("index").is_dir());
        assert_eq!(
            service.updator().usable_cache().map(CacheSynchronizer::layout),
            Some(CacheKeyLayout::Versioned)
        );
    }

    #[tokio::test]
    async fn open_rejects_invalid_config() {
        let mut config = QbankConfig::default();
        config.sync.changed_since_batch = 0;
        let err = QuestionService::open(&config, Arc::new(HealthFlags::new()))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, SyncError::Config(_)));
    }

    #[tokio::test]
    async fn disabled_backends_are_not_opened() {
        let mut config = QbankConfig::default();
        config.database.path = ":memory:".into();
        config.cache.enabled = false;
        config.search.enabled = false;

        let service = QuestionService::open(&config, Arc::new(HealthFlags::new()))
            .await
            .unwrap();
        assert!(service.updator().usable_cache().is_none());
        let err = service.search(&SearchFilter::default()).await.unwrap_err();
        assert!(matches!(err, SyncError::Unavailable("search")));
    }
}
