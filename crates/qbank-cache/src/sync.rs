//! Writes aggregates to the cache and reads them back, for either key layout.

use std::sync::Arc;
use std::time::Duration;

use qbank_config::{CacheConfig, CacheKeyLayout};
use qbank_core::aggregate::QuestionDetail;
use qbank_core::enums::CompletionStatus;
use uuid::Uuid;

use crate::backend::CacheBackend;
use crate::envelope::CacheEnvelope;
use crate::error::CacheError;
use crate::keys::{
    VersionedKey, canonical_key, versioned_any_type_pattern, versioned_key, versioned_pattern,
};

/// Key derivation, write, prune, and read-back of cached aggregates.
#[derive(Clone)]
pub struct CacheSynchronizer {
    backend: Arc<dyn CacheBackend>,
    layout: CacheKeyLayout,
    ttl: Duration,
}

impl CacheSynchronizer {
    pub fn new(backend: Arc<dyn CacheBackend>, layout: CacheKeyLayout, ttl: Duration) -> Self {
        Self {
            backend,
            layout,
            ttl,
        }
    }

    pub fn from_config(backend: Arc<dyn CacheBackend>, config: &CacheConfig) -> Self {
        Self::new(backend, config.key_layout, config.ttl())
    }

    pub const fn layout(&self) -> CacheKeyLayout {
        self.layout
    }

    pub fn backend(&self) -> &Arc<dyn CacheBackend> {
        &self.backend
    }

    /// The key `detail` is stored under in the active layout.
    #[must_use]
    pub fn key_for(&self, detail: &QuestionDetail, is_complete: bool) -> String {
        match self.layout {
            CacheKeyLayout::Canonical => canonical_key(detail.id()),
            CacheKeyLayout::Versioned => versioned_key(
                detail.question_type(),
                detail.id(),
                CompletionStatus::from_flag(is_complete),
                detail.version(),
            ),
        }
    }

    /// Write `detail` and return the key written.
    ///
    /// In the versioned layout every other key of the same question is then
    /// deleted. The scan and delete are not atomic with the write.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if encoding or any backend call fails.
    pub async fn sync(&self, detail: &QuestionDetail, is_complete: bool) -> Result<String, CacheError> {
        let status = CompletionStatus::from_flag(is_complete);
        let key = self.key_for(detail, is_complete);

        match self.layout {
            CacheKeyLayout::Canonical => {
                let value = serde_json::to_string(&CacheEnvelope::new(detail, status))?;
                self.backend.set(&key, value, self.ttl).await?;
            }
            CacheKeyLayout::Versioned => {
                let value = serde_json::to_string(detail)?;
                self.backend.set(&key, value, self.ttl).await?;

                let stale = self
                    .backend
                    .keys(&versioned_pattern(detail.question_type(), detail.id()))
                    .await?;
                for old in stale.iter().filter(|k| **k != key) {
                    self.backend.delete(old).await?;
                }
            }
        }

        tracing::debug!(
            question_id = %detail.id(),
            version = detail.version(),
            %status,
            key = %key,
            "cache synced"
        );
        Ok(key)
    }

    /// Read the cached aggregate of `id`, if any.
    ///
    /// Values that fail to decode are logged and treated as a miss. In the
    /// versioned layout the highest cached version wins.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if a backend call fails.
    pub async fn fetch(&self, id: Uuid) -> Result<Option<QuestionDetail>, CacheError> {
        match self.layout {
            CacheKeyLayout::Canonical => Ok(self.fetch_envelope(id).await?.map(|e| e.question)),
            CacheKeyLayout::Versioned => {
                let mut candidates: Vec<(i64, String)> = self
                    .backend
                    .keys(&versioned_any_type_pattern(id))
                    .await?
                    .into_iter()
                    .filter_map(|k| VersionedKey::parse(&k).map(|p| (p.version, k)))
                    .collect();
                candidates.sort_by(|a, b| b.0.cmp(&a.0));

                for (_, key) in candidates {
                    let Some(raw) = self.backend.get(&key).await? else {
                        continue;
                    };
                    match serde_json::from_str::<QuestionDetail>(&raw) {
                        Ok(detail) => return Ok(Some(detail)),
                        Err(e) => {
                            tracing::warn!(key = %key, error = %e, "undecodable cache entry, treating as miss");
                        }
                    }
                }
                Ok(None)
            }
        }
    }

    /// Is there a cache entry for `id` at exactly `version`?
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if a backend call fails.
    pub async fn probe_version(&self, id: Uuid, version: i64) -> Result<bool, CacheError> {
        match self.layout {
            CacheKeyLayout::Canonical => Ok(self
                .fetch_envelope(id)
                .await?
                .is_some_and(|e| e.version == version)),
            CacheKeyLayout::Versioned => Ok(self
                .backend
                .keys(&versioned_any_type_pattern(id))
                .await?
                .iter()
                .filter_map(|k| VersionedKey::parse(k))
                .any(|k| k.version == version)),
        }
    }

    /// Remove every cache entry of `id` under both layouts.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if a backend call fails.
    pub async fn invalidate(&self, id: Uuid) -> Result<usize, CacheError> {
        let mut removed = usize::from(self.backend.delete(&canonical_key(id)).await?);
        removed += self
            .backend
            .delete_pattern(&versioned_any_type_pattern(id))
            .await?;
        tracing::debug!(question_id = %id, removed, "cache invalidated");
        Ok(removed)
    }

    async fn fetch_envelope(&self, id: Uuid) -> Result<Option<CacheEnvelope>, CacheError> {
        let key = canonical_key(id);
        let Some(raw) = self.backend.get(&key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(envelope) => Ok(Some(envelope)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "undecodable cache entry, treating as miss");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use qbank_core::aggregate::VariantPayload;
    use qbank_core::entities::{FillInBlankAnswer, Question};
    use qbank_core::enums::QuestionType;
    use rstest::rstest;

    use super::*;
    use crate::memory::MemoryCache;

    const DAY: Duration = Duration::from_secs(86_400);

    fn detail(version: i64, answers: usize) -> QuestionDetail {
        let now = Utc::now();
        let id = Uuid::from_u128(42);
        QuestionDetail {
            question: Question {
                id,
                question_type: QuestionType::FillInBlank,
                topic: vec!["travel".into()],
                instruction: "Fill in the blank".into(),
                image_urls: Vec::new(),
                max_time: 30,
                version,
                created_at: now,
                updated_at: now,
            },
            payload: VariantPayload::FillInBlank {
                answers: (0..answers)
                    .map(|i| FillInBlankAnswer {
                        id: Uuid::new_v4(),
                        question_id: id,
                        answer: format!("answer {i}"),
                        explain: None,
                        created_at: now,
                        updated_at: now,
                    })
                    .collect(),
            },
        }
    }

    fn synchronizer(layout: CacheKeyLayout) -> (Arc<MemoryCache>, CacheSynchronizer) {
        let cache = Arc::new(MemoryCache::new());
        let sync = CacheSynchronizer::new(cache.clone(), layout, DAY);
        (cache, sync)
    }

    #[rstest]
    #[case(CacheKeyLayout::Canonical)]
    #[case(CacheKeyLayout::Versioned)]
    #[tokio::test]
    async fn exactly_one_key_per_question_after_sync(#[case] layout: CacheKeyLayout) {
        let (cache, sync) = synchronizer(layout);

        sync.sync(&detail(1, 0), false).await.unwrap();
        sync.sync(&detail(1, 1), true).await.unwrap();
        let last = sync.sync(&detail(2, 1), true).await.unwrap();

        assert_eq!(cache.keys("*").await.unwrap(), vec![last]);
    }

    #[tokio::test]
    async fn versioned_status_flip_makes_old_key_unreachable() {
        let (cache, sync) = synchronizer(CacheKeyLayout::Versioned);

        let old = sync.sync(&detail(1, 0), false).await.unwrap();
        assert!(old.ends_with(":uncomplete:1"));

        let new = sync.sync(&detail(1, 1), true).await.unwrap();
        assert!(new.ends_with(":complete:1"));
        assert_eq!(cache.get(&old).await.unwrap(), None);
        assert!(cache.get(&new).await.unwrap().is_some());
    }

    #[rstest]
    #[case(CacheKeyLayout::Canonical)]
    #[case(CacheKeyLayout::Versioned)]
    #[tokio::test]
    async fn fetch_returns_what_was_synced(#[case] layout: CacheKeyLayout) {
        let (_, sync) = synchronizer(layout);
        let d = detail(3, 2);
        sync.sync(&d, true).await.unwrap();

        assert_eq!(sync.fetch(d.id()).await.unwrap(), Some(d.clone()));
        assert_eq!(sync.fetch(Uuid::new_v4()).await.unwrap(), None);
    }

    #[rstest]
    #[case(CacheKeyLayout::Canonical)]
    #[case(CacheKeyLayout::Versioned)]
    #[tokio::test]
    async fn probe_matches_exact_version_only(#[case] layout: CacheKeyLayout) {
        let (_, sync) = synchronizer(layout);
        let d = detail(2, 1);
        sync.sync(&d, true).await.unwrap();

        assert!(sync.probe_version(d.id(), 2).await.unwrap());
        assert!(!sync.probe_version(d.id(), 1).await.unwrap());
        assert!(!sync.probe_version(d.id(), 3).await.unwrap());
    }

    #[rstest]
    #[case(CacheKeyLayout::Canonical)]
    #[case(CacheKeyLayout::Versioned)]
    #[tokio::test]
    async fn undecodable_entry_is_a_miss(#[case] layout: CacheKeyLayout) {
        let (cache, sync) = synchronizer(layout);
        let d = detail(1, 1);
        let key = sync.key_for(&d, true);
        cache.set(&key, "not json".into(), DAY).await.unwrap();

        assert_eq!(sync.fetch(d.id()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn invalidate_clears_both_layouts() {
        let cache = Arc::new(MemoryCache::new());
        let canonical = CacheSynchronizer::new(cache.clone(), CacheKeyLayout::Canonical, DAY);
        let versioned = CacheSynchronizer::new(cache.clone(), CacheKeyLayout::Versioned, DAY);
        let d = detail(1, 1);
        canonical.sync(&d, true).await.unwrap();
        versioned.sync(&d, true).await.unwrap();

        assert_eq!(canonical.invalidate(d.id()).await.unwrap(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn from_config_uses_layout_and_ttl() {
        let config = CacheConfig {
            key_layout: CacheKeyLayout::Versioned,
            ..CacheConfig::default()
        };
        let sync = CacheSynchronizer::from_config(Arc::new(MemoryCache::new()), &config);
        assert_eq!(sync.layout(), CacheKeyLayout::Versioned);
        assert_eq!(sync.ttl, DAY);
    }
}
