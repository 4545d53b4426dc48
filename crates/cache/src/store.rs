//! Process-wide keyed storage for cached responses.
//!
//! One [`CacheStore`] is the single source of truth for every wrapper
//! constructed over it. All operations are synchronous; there is no
//! eviction policy, entries only disappear through
//! [`CacheStore::clear_by_prefix`].

use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Notify;

/// One cached response slot.
///
/// `timestamp` is `None` exactly when the slot has never been populated or
/// was explicitly cleared. A set timestamp with no value yet is the pending
/// marker: a fetch has claimed the key and other callers should wait for it
/// rather than start their own.
#[derive(Debug, Clone, Default)]
pub struct CacheEntry {
    /// Stored payload; the operation's error payload when `failed` is set.
    pub value: Option<Value>,
    /// Population time in epoch seconds.
    pub timestamp: Option<i64>,
    /// Whether `value` holds the wrapped operation's error payload.
    pub failed: bool,
}

/// Shared keyed storage of `(value, timestamp, failed)` triples.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: DashMap<String, CacheEntry>,
    /// Per-key wakeup handles for callers parked on a pending fetch.
    waiters: DashMap<String, Arc<Notify>>,
}

impl CacheStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored payload for `key`, if the entry has been populated.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<Value> {
        self.entries.get(key).and_then(|entry| entry.value.clone())
    }

    /// Set the payload for `key` and wake its waiters.
    pub fn set_value(&self, key: &str, value: Value) {
        self.entries.entry(key.to_string()).or_default().value = Some(value);
        self.wake(key);
    }

    /// Whether the payload for `key` is a memoized failure.
    #[must_use]
    pub fn failed(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|entry| entry.failed)
    }

    /// Flag the payload for `key` as a failure or a success.
    pub fn set_failed(&self, key: &str, failed: bool) {
        self.entries.entry(key.to_string()).or_default().failed = failed;
    }

    /// Population timestamp for `key`, in epoch seconds.
    #[must_use]
    pub fn timestamp(&self, key: &str) -> Option<i64> {
        self.entries.get(key).and_then(|entry| entry.timestamp)
    }

    /// Set or clear the population timestamp for `key`.
    pub fn set_timestamp(&self, key: &str, timestamp: Option<i64>) {
        self.entries.entry(key.to_string()).or_default().timestamp = timestamp;
    }

    /// Atomically stamp `key` with `now` unless its current timestamp is
    /// younger than `max_age` seconds. Returns `true` when the stamp was
    /// taken and the caller owns the refetch; a `false` return means the
    /// entry is fresh (settled or pending) and the caller should read it.
    pub fn claim_timestamp(&self, key: &str, now: i64, max_age: i64) -> bool {
        let mut entry = self.entries.entry(key.to_string()).or_default();
        if entry.timestamp.is_some_and(|ts| now - ts < max_age) {
            return false;
        }
        entry.timestamp = Some(now);
        true
    }

    /// Store an outcome, payload and failure flag in one step, then wake
    /// every caller waiting on `key`.
    pub fn record(&self, key: &str, value: Value, failed: bool) {
        {
            let mut entry = self.entries.entry(key.to_string()).or_default();
            entry.value = Some(value);
            entry.failed = failed;
        }
        self.wake(key);
    }

    /// Payload and failure flag read under one lock, so a concurrent
    /// overwrite cannot pair a value with the wrong flag.
    #[must_use]
    pub fn outcome(&self, key: &str) -> Option<(Value, bool)> {
        self.entries
            .get(key)
            .and_then(|entry| entry.value.clone().map(|value| (value, entry.failed)))
    }

    /// Remove every entry whose key starts with `prefix`, clearing value,
    /// timestamp, and failure flag together. Matching waiter slots are
    /// woken and dropped with them; a parked caller holds its own clone of
    /// the handle and re-registers through [`CacheStore::waiter`] on the
    /// next check, so the map does not grow forever.
    pub fn clear_by_prefix(&self, prefix: &str) {
        self.entries.retain(|key, _| !key.starts_with(prefix));
        self.waiters.retain(|key, notify| {
            if key.starts_with(prefix) {
                notify.notify_waiters();
                false
            } else {
                true
            }
        });
    }

    /// Wakeup handle for callers waiting on `key`.
    #[must_use]
    pub fn waiter(&self, key: &str) -> Arc<Notify> {
        self.waiters.entry(key.to_string()).or_default().clone()
    }

    /// Snapshot of one entry, for inspection in tests and diagnostics.
    #[must_use]
    pub fn entry_snapshot(&self, key: &str) -> Option<CacheEntry> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Number of entries currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn wake(&self, key: &str) {
        if let Some(notify) = self.waiters.get(key) {
            notify.notify_waiters();
        }
    }
}
