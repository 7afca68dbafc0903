//! # Transaction Timestamps
//!
//! The ledger host stamps every transaction with `(seconds, nanos)` since the
//! Unix epoch. Records store the RFC 3339 rendering in UTC.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger transaction time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxTimestamp {
    /// Whole seconds since the Unix epoch.
    pub seconds: i64,
    /// Sub-second part, `0..1_000_000_000`.
    pub nanos: u32,
}

impl TxTimestamp {
    pub const fn new(seconds: i64, nanos: u32) -> Self {
        Self { seconds, nanos }
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self {
            seconds: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos(),
        }
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanos)
    }

    /// RFC 3339, second precision (`2024-05-01T10:00:00Z`). Used for the
    /// `Timestamp` field of stored records.
    pub fn to_rfc3339(&self) -> String {
        self.render(SecondsFormat::Secs)
    }

    /// RFC 3339 with nanoseconds. Used for history entries, where two
    /// transactions may land within the same second.
    pub fn to_rfc3339_nanos(&self) -> String {
        self.render(SecondsFormat::Nanos)
    }

    fn render(&self, format: SecondsFormat) -> String {
        match self.to_datetime() {
            Some(dt) => dt.to_rfc3339_opts(format, true),
            // Out of chrono's range; fall back to the raw pair.
            None => format!("{}.{:09}", self.seconds, self.nanos),
        }
    }
}

impl fmt::Display for TxTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}
