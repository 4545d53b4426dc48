//! Asynchronous response cache for docket.
//!
//! Method-level memoization for operations that yield a single
//! asynchronous value: many call sites can request the same data without
//! re-issuing redundant network calls, while each still observes a normal
//! asynchronous call. Three concerns are reconciled over one shared table:
//!
//! - **Freshness**: an entry is reused inside its age budget (ten seconds
//!   unless overridden) and overwritten in place by the first call after.
//! - **Coalescing**: equal calls issued while a fetch is in flight wait on
//!   the shared slot instead of starting their own; the operation runs at
//!   most once per window.
//! - **Failure replay**: an upstream error is stored and redelivered
//!   verbatim to every caller until the entry goes stale, then retried
//!   exactly once.
//!
//! # Example
//!
//! ```
//! use docket_cache::{CacheStore, ResponseCache};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cache = ResponseCache::new(Arc::new(CacheStore::new()));
//! let cases = cache.memoize("cases");
//!
//! let value = cases
//!     .call(&["42"], || async { Ok::<u32, String>(7) })
//!     .await
//!     .unwrap();
//! assert_eq!(value, 7);
//!
//! // Mutations purge the namespace before they run
//! cache.invalidator("cases_").wrap(|| async { /* PUT ... */ }).await;
//! # }
//! ```

pub mod errors;
pub mod freshness;
pub mod invalidate;
pub mod keys;
pub mod manager;
pub mod memo;
pub mod store;
pub mod time;

pub use self::{
    errors::{CodecOp, MemoError, MemoResult},
    freshness::{FreshnessPolicy, DEFAULT_MAX_AGE},
    invalidate::Invalidator,
    keys::{build_key, namespace_prefix, KEY_DELIMITER},
    manager::ResponseCache,
    memo::Memoized,
    store::{CacheEntry, CacheStore},
    time::{Clock, ManualClock, SystemClock},
};
