//! In-process [`CacheBackend`] on top of `moka`, with a per-entry TTL.
//!
//! Expiry is tracked by `moka` itself; writes never sweep the whole map.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use globset::{Glob, GlobMatcher};
use moka::Expiry;
use moka::future::Cache;

use crate::backend::CacheBackend;
use crate::error::CacheError;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self) -> bool {
        self.expires_at > Instant::now()
    }
}

/// Each entry lives for the `ttl` it was last written with.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Default cache backend: an unbounded `moka::future::Cache`.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Cache<String, Entry>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().expire_after(PerEntryTtl).build(),
        }
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|(_, e)| e.is_live()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn matching(&self, matcher: &GlobMatcher) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(k, e)| e.is_live() && matcher.is_match(k.as_str()))
            .map(|(k, _)| String::clone(&k))
            .collect()
    }
}

fn compile(pattern: &str) -> Result<GlobMatcher, CacheError> {
    Glob::new(pattern)
        .map(|g| g.compile_matcher())
        .map_err(|e| CacheError::InvalidPattern(format!("{pattern}: {e}")))
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self
            .entries
            .get(key)
            .await
            .filter(Entry::is_live)
            .map(|e| e.value))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let entry = Entry {
            value,
            ttl,
            expires_at: Instant::now() + ttl,
        };
        self.entries.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let removed = self.entries.remove(key).await;
        Ok(removed.is_some_and(|e| e.is_live()))
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize, CacheError> {
        let matcher = compile(pattern)?;
        let mut removed = 0;
        for key in self.matching(&matcher) {
            if self.entries.remove(&key).await.is_some_and(|e| e.is_live()) {
                removed += 1;
            }
        }
        tracing::debug!(pattern, removed, "cache delete_pattern");
        Ok(removed)
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, CacheError> {
        let matcher = compile(pattern)?;
        let mut keys = self.matching(&matcher);
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const DAY: Duration = Duration::from_secs(86_400);

    #[tokio::test]
    async fn set_get_delete() {
        let cache = MemoryCache::new();
        cache.set("a", "1".into(), DAY).await.unwrap();
        assert_eq!(cache.get("a").await.unwrap().as_deref(), Some("1"));

        cache.set("a", "2".into(), DAY).await.unwrap();
        assert_eq!(cache.get("a").await.unwrap().as_deref(), Some("2"));

        assert!(cache.delete("a").await.unwrap());
        assert!(!cache.delete("a").await.unwrap());
        assert_eq!(cache.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_entries_are_invisible() {
        let cache = MemoryCache::new();
        cache
            .set("short", "x".into(), Duration::from_millis(10))
            .await
            .unwrap();
        cache.set("long", "y".into(), DAY).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.get("short").await.unwrap(), None);
        assert_eq!(cache.keys("*").await.unwrap(), vec!["long".to_string()]);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn overwrite_takes_the_new_ttl() {
        let cache = MemoryCache::new();
        cache.set("k", "old".into(), DAY).await.unwrap();
        cache
            .set("k", "new".into(), Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("new"));

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn keys_and_delete_pattern_use_globs() {
        let cache = MemoryCache::new();
        for key in [
            "choice_one_question:q1:complete:1",
            "choice_one_question:q1:uncomplete:2",
            "choice_one_question:q2:complete:1",
            "question:q1",
        ] {
            cache.set(key, "{}".into(), DAY).await.unwrap();
        }

        let keys = cache.keys("*_question:q1:*").await.unwrap();
        assert_eq!(
            keys,
            vec![
                "choice_one_question:q1:complete:1".to_string(),
                "choice_one_question:q1:uncomplete:2".to_string(),
            ]
        );

        assert_eq!(cache.delete_pattern("*_question:q1:*").await.unwrap(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn invalid_pattern_is_rejected() {
        let cache = MemoryCache::new();
        let err = cache.keys("question:[").await.unwrap_err();
        assert!(matches!(err, CacheError::InvalidPattern(_)));
    }
}
