//! Read-only view of backend health consulted before cache and search steps.
//!
//! Polling is someone else's job: an external checker flips [`HealthFlags`].

use std::sync::atomic::{AtomicBool, Ordering};

pub trait BackendHealth: Send + Sync {
    fn is_cache_usable(&self) -> bool;
    fn is_search_usable(&self) -> bool;
}

/// Atomic flags, both usable at start.
#[derive(Debug)]
pub struct HealthFlags {
    cache: AtomicBool,
    search: AtomicBool,
}

impl Default for HealthFlags {
    fn default() -> Self {
        Self {
            cache: AtomicBool::new(true),
            search: AtomicBool::new(true),
        }
    }
}

impl HealthFlags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_cache_usable(&self, usable: bool) {
        self.cache.store(usable, Ordering::Release);
    }

    pub fn set_search_usable(&self, usable: bool) {
        self.search.store(usable, Ordering::Release);
    }
}

impl BackendHealth for HealthFlags {
    fn is_cache_usable(&self) -> bool {
        self.cache.load(Ordering::Acquire)
    }

    fn is_search_usable(&self) -> bool {
        self.search.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_flip_independently() {
        let flags = HealthFlags::new();
        assert!(flags.is_cache_usable());
        assert!(flags.is_search_usable());

        flags.set_cache_usable(false);
        assert!(!flags.is_cache_usable());
        assert!(flags.is_search_usable());

        flags.set_search_usable(false);
        flags.set_cache_usable(true);
        assert!(flags.is_cache_usable());
        assert!(!flags.is_search_usable());
    }
}
