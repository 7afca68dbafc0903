//! # Time Sources

use crate::ports::TimeSource;
use chrono::Utc;
use shared_types::TxTimestamp;
use std::sync::atomic::{AtomicI64, Ordering};

/// Wall clock, UTC.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> TxTimestamp {
        TxTimestamp::from_datetime(Utc::now())
    }
}

/// Deterministic clock: starts at a fixed instant and advances by a fixed
/// number of seconds every time a transaction reads it.
#[derive(Debug)]
pub struct ManualTimeSource {
    next_seconds: AtomicI64,
    nanos: u32,
    step_seconds: i64,
}

impl ManualTimeSource {
    pub fn new(start: TxTimestamp, step_seconds: i64) -> Self {
        Self {
            next_seconds: AtomicI64::new(start.seconds),
            nanos: start.nanos,
            step_seconds,
        }
    }

    /// Jump the clock; the next transaction is stamped `seconds`.
    pub fn set(&self, seconds: i64) {
        self.next_seconds.store(seconds, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> TxTimestamp {
        let seconds = self
            .next_seconds
            .fetch_add(self.step_seconds, Ordering::SeqCst);
        TxTimestamp::new(seconds, self.nanos)
    }
}
