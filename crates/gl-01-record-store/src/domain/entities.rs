//! # Domain Entities for the Record Store
//!
//! What the ledger host hands back: committed values with their version,
//! per-key modifications for history replay, and commit receipts.

use serde::{Deserialize, Serialize};
use shared_types::TxTimestamp;

/// A committed world-state value.
///
/// `version` is the block height of the commit that last wrote the key. The
/// read set of a transaction records the version it saw, and commit rejects
/// the transaction if any of those versions moved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionedValue {
    pub value: Vec<u8>,
    pub version: u64,
}

/// One committed write to a key, as replayed by the history reader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyModification {
    /// Id of the transaction that performed the write.
    pub tx_id: String,
    /// Timestamp of that transaction.
    pub timestamp: TxTimestamp,
    /// Value bytes as written.
    pub value: Vec<u8>,
}

/// Issued after a transaction commits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub tx_id: String,
    pub timestamp: TxTimestamp,
    /// Height of the ledger after this commit. Increments by exactly 1 per
    /// committed transaction.
    pub block_height: u64,
    /// Keys written by the transaction, sorted.
    pub keys_written: Vec<String>,
}
