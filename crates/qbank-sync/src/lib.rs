//! # qbank-sync
//!
//! Keeps the libSQL store, the cache, and the search index consistent.
//!
//! - [`updator::QuestionUpdator`]: rebuild → evaluate → cache → search, run
//!   after every committed mutation.
//! - [`service::QuestionService`]: mutation entry points, cached reads with
//!   read-repair, the versioned delta query, search, and reindex.
//! - [`health::BackendHealth`]: injected view of which backends are usable.

pub mod error;
pub mod health;
pub mod service;
pub mod updator;

pub use error::{ErrorKind, SyncError};
pub use health::{BackendHealth, HealthFlags};
pub use service::{Deletion, Mutation, QuestionService, ReindexReport, VariantMutation};
pub use updator::{Published, QuestionUpdator, RetractReport, StepOutcome, SyncReport};
