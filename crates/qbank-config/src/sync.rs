//! Propagation behaviour between the relational store, cache, and search index.

use serde::{Deserialize, Serialize};

const fn default_propagate_search_failure_on_create() -> bool {
    true
}

const fn default_changed_since_batch() -> usize {
    250
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Surface a failed search upsert to the caller of a create.
    #[serde(default = "default_propagate_search_failure_on_create")]
    pub propagate_search_failure_on_create: bool,

    /// Increment the parent version when only child rows change.
    #[serde(default)]
    pub bump_version_on_child_change: bool,

    /// Maximum `(id, version)` pairs per delta query statement.
    #[serde(default = "default_changed_since_batch")]
    pub changed_since_batch: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            propagate_search_failure_on_create: default_propagate_search_failure_on_create(),
            bump_version_on_child_change: false,
            changed_since_batch: default_changed_since_batch(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = SyncConfig::default();
        assert!(config.propagate_search_failure_on_create);
        assert!(!config.bump_version_on_child_change);
        assert_eq!(config.changed_since_batch, 250);
    }
}
