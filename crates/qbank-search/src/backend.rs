//! Document index contract consumed by the search synchronizer.

use async_trait::async_trait;
use qbank_core::search::{SearchDocument, SearchFilter, SearchPage};
use uuid::Uuid;

use crate::error::SearchError;

/// Keyed document store with filtered, paginated search.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Insert or replace the document with `doc.id`.
    async fn upsert(&self, doc: &SearchDocument) -> Result<(), SearchError>;

    /// Returns whether a document was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, SearchError>;

    async fn get(&self, id: Uuid) -> Result<Option<SearchDocument>, SearchError>;

    async fn search(&self, filter: &SearchFilter) -> Result<SearchPage<SearchDocument>, SearchError>;
}
