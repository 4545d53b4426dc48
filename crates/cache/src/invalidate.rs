//! Prefix-based purge of cached responses ahead of mutating operations.

use crate::store::CacheStore;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Purges every cache entry under a fixed key prefix.
///
/// Produced by [`ResponseCache::invalidator`](crate::ResponseCache::invalidator).
/// Wrapping a mutating operation guarantees the purge happens strictly
/// before the operation starts executing; the operation's inputs, outputs,
/// and errors pass through unmodified.
#[derive(Clone)]
pub struct Invalidator {
    store: Option<Arc<CacheStore>>,
    prefix: String,
}

impl Invalidator {
    pub(crate) fn new(store: Option<Arc<CacheStore>>, prefix: String) -> Self {
        Self { store, prefix }
    }

    /// Key prefix this handle purges.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Synchronously remove every entry whose key starts with the prefix,
    /// value, timestamp, and failure flag together.
    pub fn purge(&self) {
        if let Some(store) = &self.store {
            debug!(prefix = %self.prefix, "purging cache entries");
            store.clear_by_prefix(&self.prefix);
        }
    }

    /// Run `op` with the purge applied before it begins executing.
    pub async fn wrap<F, Fut, R>(&self, op: F) -> R
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = R>,
    {
        self.purge();
        op().await
    }
}
