//! Time-based freshness decisions over the store.

use crate::store::CacheStore;
use crate::time::Clock;
use std::sync::Arc;
use std::time::Duration;

/// Freshness window applied when the caller does not override it.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(10);

/// Decides whether a stored timestamp is still within an age budget.
#[derive(Clone)]
pub struct FreshnessPolicy {
    store: Arc<CacheStore>,
    clock: Arc<dyn Clock>,
}

impl FreshnessPolicy {
    #[must_use]
    pub fn new(store: Arc<CacheStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Whether `key` was stamped less than `max_age` ago. An entry with no
    /// timestamp is never fresh.
    #[must_use]
    pub fn is_fresh(&self, key: &str, max_age: Duration) -> bool {
        let now = self.clock.epoch_seconds();
        self.store
            .timestamp(key)
            .is_some_and(|ts| now - ts < max_age.as_secs() as i64)
    }

    /// Stamp `key` with the current time.
    pub fn mark_fresh(&self, key: &str) {
        self.store
            .set_timestamp(key, Some(self.clock.epoch_seconds()));
    }

    /// Clear the timestamp so the next call refetches.
    pub fn mark_stale(&self, key: &str) {
        self.store.set_timestamp(key, None);
    }

    /// Claim `key` for a new fetch unless it is still fresh. The check and
    /// the stamp happen under one entry lock, so two racing callers cannot
    /// both own the refetch. Returns `true` for the owner.
    pub fn claim_if_stale(&self, key: &str, max_age: Duration) -> bool {
        self.store.claim_timestamp(
            key,
            self.clock.epoch_seconds(),
            max_age.as_secs() as i64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;

    fn policy_at(epoch: i64) -> (FreshnessPolicy, Arc<ManualClock>, Arc<CacheStore>) {
        let store = Arc::new(CacheStore::new());
        let clock = Arc::new(ManualClock::new(epoch));
        let policy = FreshnessPolicy::new(Arc::clone(&store), clock.clone() as Arc<dyn Clock>);
        (policy, clock, store)
    }

    #[test]
    fn never_populated_is_not_fresh() {
        let (policy, _clock, _store) = policy_at(1_000);
        assert!(!policy.is_fresh("cases_1", DEFAULT_MAX_AGE));
    }

    #[test]
    fn boundary_is_strict() {
        let (policy, clock, _store) = policy_at(1_000);
        policy.mark_fresh("cases_1");

        clock.advance(9);
        assert!(policy.is_fresh("cases_1", DEFAULT_MAX_AGE));
        clock.advance(1);
        // now - ts == max_age: no longer fresh
        assert!(!policy.is_fresh("cases_1", DEFAULT_MAX_AGE));
    }

    #[test]
    fn mark_stale_clears_the_timestamp() {
        let (policy, _clock, store) = policy_at(1_000);
        policy.mark_fresh("cases_1");
        policy.mark_stale("cases_1");
        assert_eq!(store.timestamp("cases_1"), None);
        assert!(!policy.is_fresh("cases_1", DEFAULT_MAX_AGE));
    }

    #[test]
    fn only_one_of_two_racing_claims_wins() {
        let (policy, _clock, _store) = policy_at(1_000);
        assert!(policy.claim_if_stale("cases_1", DEFAULT_MAX_AGE));
        assert!(!policy.claim_if_stale("cases_1", DEFAULT_MAX_AGE));
    }
}
