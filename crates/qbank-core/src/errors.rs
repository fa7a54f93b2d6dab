//! Cross-cutting error types for qbank.
//!
//! Domain-specific errors (`DatabaseError`, `CacheError`, `SearchError`) live in
//! their own crates. `SyncError` in `qbank-sync` is where they converge.

use thiserror::Error;

/// Errors that can be raised by any qbank crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A type discriminator matched no known question type.
    #[error("Unknown question type: {0}")]
    UnknownType(String),

    /// Input failed validation before any persistence.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
