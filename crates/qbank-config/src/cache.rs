//! Cache configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 24 hours.
const fn default_ttl_secs() -> u64 {
    86_400
}

const fn default_enabled() -> bool {
    true
}

/// How cache keys are laid out per question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKeyLayout {
    /// One key `question:{id}` whose value carries version and status.
    #[default]
    Canonical,
    /// `{type}_question:{id}:{status}:{version}`, pruned by pattern scan after each write.
    Versioned,
}

/// Settings for the aggregate cache.
///
/// The bundled backend is in-process: entries live only as long as the
/// `QuestionService` that wrote them. Long-running hosts benefit from it; the
/// `qbank` binary turns it off because every invocation would start empty.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// When false the cache steps of every sync are skipped.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Expiry applied to every cache write, in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    #[serde(default)]
    pub key_layout: CacheKeyLayout,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            ttl_secs: default_ttl_secs(),
            key_layout: CacheKeyLayout::default(),
        }
    }
}

impl CacheConfig {
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}
