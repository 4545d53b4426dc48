//! Facade handing out memoization and invalidation handles over one store.

use crate::invalidate::Invalidator;
use crate::memo::Memoized;
use crate::store::CacheStore;
use crate::time::{Clock, SystemClock};
use std::sync::Arc;
use tracing::warn;

/// Entry point for wrapping operations over a shared [`CacheStore`].
///
/// Explicitly constructed and injectable: independent caches coexist by
/// holding separate stores, and tests isolate state per instance. Every
/// handle produced by one facade shares its store, so namespace choice
/// controls which call sites share entries.
#[derive(Clone)]
pub struct ResponseCache {
    store: Option<Arc<CacheStore>>,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    /// Cache backed by `store`, using wall-clock time.
    #[must_use]
    pub fn new(store: Arc<CacheStore>) -> Self {
        Self {
            store: Some(store),
            clock: Arc::new(SystemClock),
        }
    }

    /// Cache with no reachable store: every wrapped call degrades to a
    /// direct passthrough, nothing is memoized, and no error is raised for
    /// the degradation.
    #[must_use]
    pub fn detached() -> Self {
        warn!("response cache running detached, calls will not be memoized");
        Self {
            store: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source, for tests driving expiry manually.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Shared store backing this cache, when attached.
    #[must_use]
    pub fn store(&self) -> Option<&Arc<CacheStore>> {
        self.store.as_ref()
    }

    /// Memoization handle for `namespace` with the default ten-second
    /// freshness window; override per handle via [`Memoized::max_age`].
    #[must_use]
    pub fn memoize(&self, namespace: impl Into<String>) -> Memoized {
        Memoized::new(
            self.store.clone(),
            Arc::clone(&self.clock),
            namespace.into(),
        )
    }

    /// Invalidation handle purging every key under `prefix`.
    #[must_use]
    pub fn invalidator(&self, prefix: impl Into<String>) -> Invalidator {
        Invalidator::new(self.store.clone(), prefix.into())
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(Arc::new(CacheStore::new()))
    }
}
