//! Search index configuration.

use serde::{Deserialize, Serialize};

const fn default_enabled() -> bool {
    true
}

fn default_path() -> String {
    ".qbank/search.db".to_string()
}

const fn default_page_size() -> u32 {
    20
}

const fn default_max_page_size() -> u32 {
    100
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// When false the search steps of every sync are skipped.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Path of the libSQL file holding the full-text index.
    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Upper bound applied to any requested page size.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            path: default_path(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}
