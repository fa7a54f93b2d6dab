//! Error type for the sync layer and its mapping to the caller-facing taxonomy.

use qbank_cache::CacheError;
use qbank_config::ConfigError;
use qbank_core::errors::CoreError;
use qbank_db::error::DatabaseError;
use qbank_search::SearchError;

/// Caller-facing error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    UnknownType,
    Transport,
    Conflict,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// A backend needed by the call is disabled or marked unusable.
    #[error("{0} backend unavailable")]
    Unavailable(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Database(e) => match e {
                DatabaseError::Validation(_) => ErrorKind::Validation,
                DatabaseError::NotFound { .. } => ErrorKind::NotFound,
                DatabaseError::UnknownType(_) => ErrorKind::UnknownType,
                DatabaseError::Conflict(_) => ErrorKind::Conflict,
                DatabaseError::LibSql(_) => ErrorKind::Transport,
                _ => ErrorKind::Internal,
            },
            Self::Core(e) => match e {
                CoreError::Validation(_) => ErrorKind::Validation,
                CoreError::NotFound { .. } => ErrorKind::NotFound,
                CoreError::UnknownType(_) => ErrorKind::UnknownType,
                CoreError::Other(_) => ErrorKind::Internal,
            },
            Self::Cache(CacheError::Transport(_))
            | Self::Search(SearchError::Transport(_) | SearchError::Database(_))
            | Self::Unavailable(_) => ErrorKind::Transport,
            Self::Search(SearchError::InvalidQuery(_)) | Self::Config(_) => ErrorKind::Validation,
            Self::Cache(_) | Self::Search(_) | Self::Io(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(DatabaseError::Validation("x".into()).into(), ErrorKind::Validation)]
    #[case(DatabaseError::NotFound { entity_type: "question".into(), id: "1".into() }.into(), ErrorKind::NotFound)]
    #[case(DatabaseError::UnknownType("essay".into()).into(), ErrorKind::UnknownType)]
    #[case(DatabaseError::Conflict("x".into()).into(), ErrorKind::Conflict)]
    #[case(DatabaseError::NoResult.into(), ErrorKind::Internal)]
    #[case(CacheError::Transport("down".into()).into(), ErrorKind::Transport)]
    #[case(SearchError::Transport("down".into()).into(), ErrorKind::Transport)]
    #[case(SearchError::InvalidQuery("".into()).into(), ErrorKind::Validation)]
    #[case(SyncError::Unavailable("search"), ErrorKind::Transport)]
    #[case(CoreError::UnknownType("essay".into()).into(), ErrorKind::UnknownType)]
    fn maps_to_taxonomy(#[case] err: SyncError, #[case] kind: ErrorKind) {
        assert_eq!(err.kind(), kind);
    }
}
