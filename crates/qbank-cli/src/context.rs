use std::sync::Arc;

use anyhow::Context;
use qbank_config::QbankConfig;
use qbank_sync::{HealthFlags, QuestionService};

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: QuestionService,
    pub config: QbankConfig,
}

impl AppContext {
    pub async fn init(config: QbankConfig) -> anyhow::Result<Self> {
        let config = without_process_cache(config);
        let service = QuestionService::open(&config, Arc::new(HealthFlags::new()))
            .await
            .context("failed to open question service")?;
        Ok(Self { service, config })
    }
}

/// The in-process cache dies with each `qbank` invocation, so the binary
/// reads and writes the store directly.
fn without_process_cache(mut config: QbankConfig) -> QbankConfig {
    if config.cache.enabled {
        tracing::debug!("in-process cache disabled for the CLI");
        config.cache.enabled = false;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_never_opens_the_process_cache() {
        let config = without_process_cache(QbankConfig::default());
        assert!(!config.cache.enabled);
        assert!(config.search.enabled);
    }
}
