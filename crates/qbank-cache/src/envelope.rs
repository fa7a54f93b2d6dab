//! Value stored under the canonical key.

use qbank_core::aggregate::QuestionDetail;
use qbank_core::enums::CompletionStatus;
use serde::{Deserialize, Serialize};

/// Aggregate plus the version and status the versioned layout encodes in its key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEnvelope {
    pub version: i64,
    pub status: CompletionStatus,
    pub question: QuestionDetail,
}

impl CacheEnvelope {
    #[must_use]
    pub fn new(detail: &QuestionDetail, status: CompletionStatus) -> Self {
        Self {
            version: detail.version(),
            status,
            question: detail.clone(),
        }
    }
}
