//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the record store depends on. The ledger host provides
//! atomicity and ordering through its own consensus; nothing here
//! reimplements that.

use crate::domain::{CommitReceipt, KeyModification};
use shared_types::{StoreError, TxTimestamp};

/// Cursor over a key's change log.
///
/// Dropping the cursor releases the host-side query resource, so an early
/// return (including `?`) never leaks it.
pub type HistoryIter = Box<dyn Iterator<Item = Result<KeyModification, StoreError>> + Send>;

// =============================================================================
// LEDGER STUB
// =============================================================================

/// The ledger host as seen from inside one transaction.
///
/// Every contract operation receives a `&mut dyn LedgerStub` and performs its
/// whole read-modify-write sequence through it. The stub never commits; the
/// caller that opened the transaction decides.
pub trait LedgerStub {
    /// Read a key. `Ok(None)` if the key has never been written.
    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Queue a write. Visible to later reads in the same transaction, and to
    /// everyone else only after commit.
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Open a cursor over the committed modifications of `key`, in the order
    /// the host delivers them.
    fn get_history_for_key(&mut self, key: &str) -> Result<HistoryIter, StoreError>;

    /// Timestamp of the current transaction.
    fn tx_timestamp(&self) -> TxTimestamp;

    /// Id of the current transaction.
    fn tx_id(&self) -> &str;
}

// =============================================================================
// TIME SOURCE
// =============================================================================

/// Abstract interface for transaction time (for testability).
pub trait TimeSource: Send + Sync {
    /// Timestamp for a transaction being opened now.
    fn now(&self) -> TxTimestamp;
}

// =============================================================================
// COMMIT OBSERVER
// =============================================================================

/// Receives a notification after every successful commit.
///
/// Observers run after the write lock is released and cannot veto or alter
/// the commit. A failed or dropped transaction produces no notification.
pub trait CommitObserver: Send + Sync {
    fn on_commit(&self, receipt: &CommitReceipt);
}
