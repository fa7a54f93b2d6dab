//! # qbank-search
//!
//! Search side of the question sync pipeline.
//!
//! - [`backend::SearchBackend`]: async document index contract.
//! - [`index::LibsqlSearchIndex`]: libSQL table plus FTS5 (porter stemming)
//!   over instruction, topic, and variant text, with type, skill, status, and
//!   topic filters and page/limit pagination.
//! - [`sync::SearchSynchronizer`]: aggregate to document projection, upsert
//!   and delete, and the [`sync::SearchFailurePolicy`] applied by callers.

pub mod backend;
pub mod error;
pub mod index;
pub mod sync;

pub use backend::SearchBackend;
pub use error::SearchError;
pub use index::LibsqlSearchIndex;
pub use sync::{SearchFailurePolicy, SearchSynchronizer};
