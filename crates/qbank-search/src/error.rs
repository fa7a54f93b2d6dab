//! Search error types for qbank-search.

use qbank_db::error::DatabaseError;

/// Errors from search backends and the search synchronizer.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The backend could not be reached or rejected the request.
    #[error("search transport error: {0}")]
    Transport(String),

    /// Error from the libSQL index database.
    #[error("search database error: {0}")]
    Database(#[from] libsql::Error),

    /// A stored document row could not be decoded.
    #[error("search row error: {0}")]
    Row(#[from] DatabaseError),

    /// A document could not be encoded or decoded as JSON.
    #[error("search serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid or empty search query.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}
