//! Projects aggregates into search documents and writes them to the index.

use std::sync::Arc;

use qbank_core::aggregate::QuestionDetail;
use qbank_core::enums::CompletionStatus;
use qbank_core::search::{SearchDocument, SearchFilter, SearchPage};
use uuid::Uuid;

use crate::backend::SearchBackend;
use crate::error::SearchError;

/// What to do when a search write fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFailurePolicy {
    /// Return the error to the caller (question creation).
    Propagate,
    /// Log and continue (updates and deletes).
    Absorb,
}

impl SearchFailurePolicy {
    #[must_use]
    pub const fn on_create(propagate: bool) -> Self {
        if propagate { Self::Propagate } else { Self::Absorb }
    }

    /// `Ok(true)` when the write succeeded, `Ok(false)` when a failure was absorbed.
    ///
    /// # Errors
    ///
    /// Returns the original error under [`SearchFailurePolicy::Propagate`].
    pub fn handle(self, id: Uuid, result: Result<(), SearchError>) -> Result<bool, SearchError> {
        match (result, self) {
            (Ok(()), _) => Ok(true),
            (Err(e), Self::Propagate) => Err(e),
            (Err(e), Self::Absorb) => {
                tracing::warn!(question_id = %id, error = %e, "search write failed, continuing");
                Ok(false)
            }
        }
    }
}

/// Upsert and delete of search documents.
#[derive(Clone)]
pub struct SearchSynchronizer {
    backend: Arc<dyn SearchBackend>,
}

impl SearchSynchronizer {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn SearchBackend> {
        &self.backend
    }

    /// Idempotent: an existing document with the same id is replaced.
    ///
    /// # Errors
    ///
    /// Returns `SearchError` if the payload cannot be encoded or the backend fails.
    pub async fn upsert(
        &self,
        detail: &QuestionDetail,
        status: CompletionStatus,
    ) -> Result<(), SearchError> {
        let doc = SearchDocument::from_detail(detail, status)?;
        self.backend.upsert(&doc).await?;
        tracing::debug!(
            question_id = %detail.id(),
            version = detail.version(),
            %status,
            "search document upserted"
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SearchError` if the backend fails.
    pub async fn delete(&self, id: Uuid) -> Result<bool, SearchError> {
        let removed = self.backend.delete(id).await?;
        tracing::debug!(question_id = %id, removed, "search document deleted");
        Ok(removed)
    }

    /// # Errors
    ///
    /// Returns `SearchError` for an invalid filter or a backend failure.
    pub async fn search(
        &self,
        filter: &SearchFilter,
    ) -> Result<SearchPage<SearchDocument>, SearchError> {
        self.backend.search(filter).await
    }
}
