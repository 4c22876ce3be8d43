//! Time source abstraction.
//!
//! The inventory services never call `Utc::now()` directly; they ask an
//! injected [`Clock`]. Production uses [`SystemClock`], tests use
//! [`ManualClock`] to step past hold deadlines without sleeping.

use std::sync::Mutex;

use chrono::{Duration, SubsecRound, Utc};

use crate::types::Timestamp;

/// A source of the current UTC time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    time: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(time: Timestamp) -> Self {
        Self {
            time: Mutex::new(time),
        }
    }

    /// Start at the current wall-clock time, truncated to the microsecond
    /// precision PostgreSQL stores.
    pub fn starting_now() -> Self {
        Self::new(Utc::now().trunc_subsecs(6))
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut time = self.time.lock().unwrap_or_else(|e| e.into_inner());
        *time += by;
    }

    pub fn set(&self, to: Timestamp) {
        let mut time = self.time.lock().unwrap_or_else(|e| e.into_inner());
        *time = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.time.lock().unwrap_or_else(|e| e.into_inner())
    }
}
