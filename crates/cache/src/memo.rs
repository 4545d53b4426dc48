//! Method-level memoization of asynchronous operations.
//!
//! A [`Memoized`] handle wraps an operation that yields exactly one value
//! or one error. The first call for a key stamps the entry's timestamp
//! before the operation settles (the pending marker), so equal calls that
//! arrive while the fetch is in flight wait on the shared slot instead of
//! starting their own. The outcome, success or failure, is stored and
//! delivered to every waiter; a failure is replayed verbatim until the
//! entry crosses its freshness window, at which point the next call
//! refetches exactly once.
//!
//! Waiters park on a per-key [`tokio::sync::Notify`] handed out by the
//! store and re-check the slot on every wake. The fetch itself runs as a
//! detached task: a caller dropping its future stops its own waiting but
//! never cancels the underlying operation. An operation that never settles
//! leaves its waiters blocked; no timeout is applied anywhere.

use crate::errors::{CodecOp, MemoError, MemoResult};
use crate::freshness::{FreshnessPolicy, DEFAULT_MAX_AGE};
use crate::keys::build_key;
use crate::store::CacheStore;
use crate::time::Clock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Marker field stored when a fetched payload itself refused to encode;
/// waiters translate it into a codec error instead of an upstream one.
const ENCODE_FAILURE_FIELD: &str = "__docket_cache_encode_failure__";

/// A namespaced, freshness-bounded view of the cache that wraps
/// asynchronous operations.
///
/// Produced by [`ResponseCache::memoize`](crate::ResponseCache::memoize).
/// All handles over the same store and namespace share entries; namespace
/// choice is what controls sharing vs. isolation.
pub struct Memoized {
    store: Option<Arc<CacheStore>>,
    clock: Arc<dyn Clock>,
    namespace: String,
    max_age: Duration,
}

impl Memoized {
    pub(crate) fn new(
        store: Option<Arc<CacheStore>>,
        clock: Arc<dyn Clock>,
        namespace: String,
    ) -> Self {
        Self {
            store,
            clock,
            namespace,
            max_age: DEFAULT_MAX_AGE,
        }
    }

    /// Override the freshness window (ten seconds by default).
    #[must_use]
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Namespace this handle stores under.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Invoke `fetch` through the cache.
    ///
    /// Within one freshness window, equal-argument calls run the operation
    /// at most once and observe the same eventual outcome, failures
    /// included. Without a backing store the call degrades to a direct
    /// passthrough and nothing is memoized.
    pub async fn call<T, E, F, Fut>(&self, args: &[&str], fetch: F) -> MemoResult<T, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        E: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let Some(store) = &self.store else {
            return fetch().await.map_err(MemoError::Upstream);
        };

        let key = build_key(&self.namespace, args);
        let policy = FreshnessPolicy::new(Arc::clone(store), Arc::clone(&self.clock));

        if policy.claim_if_stale(&key, self.max_age) {
            debug!(key = %key, "stale or missing, starting fetch");
            let task = spawn_fetch(Arc::clone(store), key.clone(), fetch());
            // The claimant resolves with its own fetch's outcome, not with
            // a value left behind by the previous window.
            if let Err(join_err) = task.await {
                if join_err.is_panic() {
                    std::panic::resume_unwind(join_err.into_panic());
                }
                // Runtime shut down under the task; wait like any consumer.
            }
        } else {
            debug!(key = %key, "fresh entry or fetch in flight");
        }

        await_settled(store, &key).await
    }
}

/// Run the fetch as a detached task so consumer cancellation never reaches
/// the underlying operation, and settle the store with its outcome.
fn spawn_fetch<T, E>(
    store: Arc<CacheStore>,
    key: String,
    fut: impl Future<Output = Result<T, E>> + Send + 'static,
) -> tokio::task::JoinHandle<()>
where
    T: Serialize + Send + 'static,
    E: Serialize + Send + 'static,
{
    tokio::spawn(async move {
        match fut.await {
            Ok(value) => settle(&store, &key, serde_json::to_value(&value), false),
            Err(err) => settle(&store, &key, serde_json::to_value(&err), true),
        }
    })
}

fn settle(store: &CacheStore, key: &str, encoded: serde_json::Result<Value>, failed: bool) {
    match encoded {
        Ok(value) => {
            debug!(key = %key, failed, "fetch settled");
            store.record(key, value, failed);
        }
        Err(err) => {
            warn!(key = %key, error = %err, "payload refused to encode, recording codec failure");
            store.record(
                key,
                serde_json::json!({ ENCODE_FAILURE_FIELD: err.to_string() }),
                true,
            );
        }
    }
}

/// Park on the per-key waiter until the slot holds a value, then resolve
/// or replay it. The notified future is created before the re-check so a
/// settle landing in the gap still wakes us.
async fn await_settled<T, E>(store: &Arc<CacheStore>, key: &str) -> MemoResult<T, E>
where
    T: DeserializeOwned,
    E: DeserializeOwned,
{
    loop {
        if let Some((value, failed)) = store.outcome(key) {
            return decode_outcome(key, value, failed);
        }
        let notify = store.waiter(key);
        let notified = notify.notified();
        if let Some((value, failed)) = store.outcome(key) {
            return decode_outcome(key, value, failed);
        }
        notified.await;
    }
}

fn decode_outcome<T, E>(key: &str, value: Value, failed: bool) -> MemoResult<T, E>
where
    T: DeserializeOwned,
    E: DeserializeOwned,
{
    if failed {
        if let Some(reason) = encode_failure_reason(&value) {
            return Err(MemoError::codec(key, CodecOp::Encode, reason));
        }
        match serde_json::from_value::<E>(value) {
            Ok(err) => Err(MemoError::Upstream(err)),
            Err(err) => Err(MemoError::codec(key, CodecOp::Decode, err.to_string())),
        }
    } else {
        serde_json::from_value::<T>(value)
            .map_err(|err| MemoError::codec(key, CodecOp::Decode, err.to_string()))
    }
}

fn encode_failure_reason(value: &Value) -> Option<String> {
    value
        .as_object()
        .and_then(|obj| obj.get(ENCODE_FAILURE_FIELD))
        .and_then(Value::as_str)
        .map(str::to_string)
}
