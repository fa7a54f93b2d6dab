//! # qbank-config
//!
//! Layered configuration loading for qbank using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`QBANK_*` prefix, `__` as separator)
//! 2. Project-level `.qbank/config.toml`
//! 3. User-level `~/.config/qbank/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `QBANK_CACHE__TTL_SECS` -> `cache.ttl_secs`,
//! `QBANK_SYNC__CHANGED_SINCE_BATCH` -> `sync.changed_since_batch`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use qbank_config::QbankConfig;
//!
//! let config = QbankConfig::load_with_dotenv().expect("config");
//! config.validate().expect("valid config");
//! println!("database: {}", config.database.path);
//! ```

mod cache;
mod database;
mod error;
mod search;
mod sync;

pub use cache::{CacheConfig, CacheKeyLayout};
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use search::SearchConfig;
pub use sync::SyncConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QbankConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

impl QbankConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be parsed or a value has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".qbank/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("QBANK_").split("__"))
    }

    /// Reject values that would make the service misbehave at runtime.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` for an empty database path and
    /// `ConfigError::InvalidValue` for zero TTL, batch, or page sizes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::NotConfigured {
                section: "database".into(),
            });
        }
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::invalid("cache.ttl_secs", "must be greater than zero"));
        }
        if self.search.default_page_size == 0 {
            return Err(ConfigError::invalid(
                "search.default_page_size",
                "must be greater than zero",
            ));
        }
        if self.search.max_page_size < self.search.default_page_size {
            return Err(ConfigError::invalid(
                "search.max_page_size",
                "must be at least search.default_page_size",
            ));
        }
        if self.sync.changed_since_batch == 0 {
            return Err(ConfigError::invalid(
                "sync.changed_since_batch",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("qbank").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) or current dir looking
    /// for a `.env` file. Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = QbankConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache.key_layout, CacheKeyLayout::Canonical);
        assert!(!config.sync.bump_version_on_child_change);
    }

    #[test]
    fn figment_builds_without_files() {
        let config: QbankConfig = QbankConfig::figment()
            .extract()
            .expect("should extract defaults");
        assert_eq!(config.search.default_page_size, 20);
        assert_eq!(config.sync.changed_since_batch, 250);
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let mut config = QbankConfig::default();
        config.cache.ttl_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "cache.ttl_secs"
        ));
    }

    #[test]
    fn zero_batch_is_rejected() {
        let mut config = QbankConfig::default();
        config.sync.changed_since_batch = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_database_path_is_not_configured() {
        let mut config = QbankConfig::default();
        config.database.path = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotConfigured { .. })
        ));
    }
}
