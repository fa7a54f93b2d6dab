//! Cache key derivation for both key layouts.

use std::str::FromStr;

use qbank_core::enums::{CompletionStatus, QuestionType};
use uuid::Uuid;

/// Canonical layout: one key per question.
#[must_use]
pub fn canonical_key(id: Uuid) -> String {
    format!("question:{id}")
}

/// Versioned layout: `{type}_question:{id}:{status}:{version}`.
#[must_use]
pub fn versioned_key(
    question_type: QuestionType,
    id: Uuid,
    status: CompletionStatus,
    version: i64,
) -> String {
    format!("{question_type}_question:{id}:{status}:{version}")
}

/// Every versioned key of one question of a known type.
#[must_use]
pub fn versioned_pattern(question_type: QuestionType, id: Uuid) -> String {
    format!("{question_type}_question:{id}:*")
}

/// Every versioned key of one question, whatever its type.
#[must_use]
pub fn versioned_any_type_pattern(id: Uuid) -> String {
    format!("*_question:{id}:*")
}

/// Components of a versioned key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionedKey {
    pub question_type: QuestionType,
    pub id: Uuid,
    pub status: CompletionStatus,
    pub version: i64,
}

impl VersionedKey {
    /// Parse a key written by [`versioned_key`]. Anything else yields `None`.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        let mut parts = key.split(':');
        let prefix = parts.next()?;
        let id = parts.next()?;
        let status = parts.next()?;
        let version = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            question_type: QuestionType::from_str(prefix.strip_suffix("_question")?).ok()?,
            id: Uuid::parse_str(id).ok()?,
            status: CompletionStatus::from_str(status).ok()?,
            version: version.parse().ok()?,
        })
    }
}
