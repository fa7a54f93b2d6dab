//! # qbank-cache
//!
//! Cache side of the question sync pipeline.
//!
//! - [`backend::CacheBackend`]: async key-value contract (get/set with TTL,
//!   delete, glob scan and delete).
//! - [`memory::MemoryCache`]: in-process default backend.
//! - [`sync::CacheSynchronizer`]: derives keys for the configured
//!   [`qbank_config::CacheKeyLayout`], writes aggregates, prunes stale keys,
//!   and reads them back.

pub mod backend;
pub mod envelope;
pub mod error;
pub mod keys;
pub mod memory;
pub mod sync;

pub use backend::CacheBackend;
pub use envelope::CacheEnvelope;
pub use error::CacheError;
pub use memory::MemoryCache;
pub use sync::CacheSynchronizer;
