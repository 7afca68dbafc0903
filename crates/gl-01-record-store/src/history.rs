//! # Audit / History Reader
//!
//! Replays the change log of one key into timestamped snapshots. Read-only
//! and restartable: calling it any number of times never mutates state.

use crate::codec::decode;
use crate::ports::LedgerStub;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::CoreError;
use tracing::debug;

/// One snapshot of a key, as of one committed transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(rename = "TxId")]
    pub tx_id: String,
    /// RFC 3339 with nanoseconds.
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Value")]
    pub value: Value,
}

/// Read every committed snapshot of `key` in host delivery order.
///
/// A key with no history yields an empty list. A cursor failure aborts with
/// `HostFailure`, an unparsable snapshot with `Corrupt`; in both cases the
/// cursor is dropped (and so released) before returning.
pub fn read_history(
    stub: &mut dyn LedgerStub,
    key: &str,
) -> Result<Vec<HistoryRecord>, CoreError> {
    let cursor = stub.get_history_for_key(key)?;
    let mut records = Vec::new();

    for entry in cursor {
        let modification = entry?;
        let value: Value = decode(key, &modification.value)?;
        records.push(HistoryRecord {
            tx_id: modification.tx_id,
            timestamp: modification.timestamp.to_rfc3339_nanos(),
            value,
        });
    }

    debug!(key, entries = records.len(), "History replayed");
    Ok(records)
}
