//! Key-value backend contract consumed by the cache synchronizer.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

/// Minimal Redis-like surface: string values, per-key TTL, glob key scans.
///
/// Patterns use glob syntax (`*` matches any run of characters).
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Returns whether the key existed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Delete every live key matching `pattern`, returning how many were removed.
    async fn delete_pattern(&self, pattern: &str) -> Result<usize, CacheError>;

    /// Live keys matching `pattern`, sorted.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, CacheError>;
}
