//! Time source abstraction for freshness decisions.
//!
//! Entries carry epoch-second timestamps, so the only thing the cache
//! needs from a clock is the current epoch second. Injecting the clock
//! lets tests drive expiry deterministically.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time in whole seconds since the Unix epoch.
pub trait Clock: Send + Sync {
    /// Current epoch second.
    fn epoch_seconds(&self) -> i64;
}

/// Wall-clock time source used outside of tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_seconds(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => elapsed.as_secs() as i64,
            // Clock before the epoch; treat as time zero
            Err(_) => 0,
        }
    }
}

/// Manually advanced clock, for tests that cross freshness windows.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    #[must_use]
    pub fn new(epoch_seconds: i64) -> Self {
        Self {
            now: AtomicI64::new(epoch_seconds),
        }
    }

    /// Move the clock forward by `seconds`.
    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }

    /// Jump the clock to an absolute epoch second.
    pub fn set(&self, epoch_seconds: i64) {
        self.now.store(epoch_seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn epoch_seconds(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
