//! # In-Memory Ledger Host
//!
//! Reference implementation of the ledger host for tests and the runtime
//! driver. Production deployments run the contracts against a real ledger
//! peer; this adapter reproduces the transaction semantics the contracts rely
//! on:
//!
//! - one transaction per operation, with its own id and timestamp
//! - reads see the transaction's own pending writes first
//! - commit is all-or-nothing and rejects stale reads (optimistic concurrency)
//! - every committed write is appended to the key's history

use crate::adapters::time::SystemTimeSource;
use crate::domain::{CommitReceipt, KeyModification, VersionedValue};
use crate::ports::{CommitObserver, HistoryIter, LedgerStub, TimeSource};
use parking_lot::RwLock;
use shared_types::{StoreError, TxTimestamp};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

// =============================================================================
// FAULT INJECTION
// =============================================================================

/// Failures the host should simulate. Empty by default.
#[derive(Clone, Debug, Default)]
pub struct FaultPlan {
    /// `put_state` on these keys fails with `WriteRejected`.
    pub reject_writes: HashSet<String>,
    /// History cursors fail after yielding this many entries.
    pub break_history_after: Option<usize>,
    /// Every stub call fails with `Unavailable`.
    pub unavailable: bool,
}

// =============================================================================
// LEDGER
// =============================================================================

#[derive(Default)]
struct WorldState {
    entries: HashMap<String, VersionedValue>,
    history: HashMap<String, Vec<KeyModification>>,
    height: u64,
}

/// In-memory ledger with transactional writes and per-key history.
pub struct InMemoryLedger {
    state: RwLock<WorldState>,
    time: Arc<dyn TimeSource>,
    faults: RwLock<FaultPlan>,
    observers: RwLock<Vec<Arc<dyn CommitObserver>>>,
    open_cursors: Arc<AtomicUsize>,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedger {
    /// Create an empty ledger stamped by the wall clock.
    pub fn new() -> Self {
        Self::with_time_source(Arc::new(SystemTimeSource))
    }

    pub fn with_time_source(time: Arc<dyn TimeSource>) -> Self {
        Self {
            state: RwLock::new(WorldState::default()),
            time,
            faults: RwLock::new(FaultPlan::default()),
            observers: RwLock::new(Vec::new()),
            open_cursors: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Register an observer for post-commit notifications.
    pub fn subscribe(&self, observer: Arc<dyn CommitObserver>) {
        self.observers.write().push(observer);
    }

    /// Open a transaction.
    pub fn begin(&self) -> LedgerTransaction<'_> {
        LedgerTransaction {
            ledger: self,
            tx_id: Uuid::new_v4().simple().to_string(),
            timestamp: self.time.now(),
            read_set: HashMap::new(),
            write_set: BTreeMap::new(),
        }
    }

    /// Run `op` in a fresh transaction and commit it if `op` succeeds.
    ///
    /// If `op` fails, the transaction is dropped and nothing it wrote becomes
    /// visible. If the commit itself fails (read conflict), the error is
    /// returned and nothing is applied either.
    pub fn submit<T, E, F>(&self, op: F) -> Result<(T, CommitReceipt), E>
    where
        F: FnOnce(&mut dyn LedgerStub) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut tx = self.begin();
        let output = op(&mut tx as &mut dyn LedgerStub)?;
        let receipt = tx.commit()?;
        Ok((output, receipt))
    }

    /// Run `op` in a fresh transaction that is never committed.
    pub fn evaluate<T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn LedgerStub) -> Result<T, E>,
    {
        let mut tx = self.begin();
        op(&mut tx as &mut dyn LedgerStub)
    }

    /// Commit raw bytes under `key` in their own transaction, bypassing any
    /// contract. Used to stage records written by another contract version.
    pub fn seed_raw(&self, key: &str, value: Vec<u8>) -> Result<CommitReceipt, StoreError> {
        let mut tx = self.begin();
        tx.write_set.insert(key.to_string(), value);
        tx.commit()
    }

    pub fn inject_faults(&self, plan: FaultPlan) {
        *self.faults.write() = plan;
    }

    pub fn clear_faults(&self) {
        *self.faults.write() = FaultPlan::default();
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.write().unavailable = unavailable;
    }

    /// Committed value of `key`, if any.
    pub fn committed_value(&self, key: &str) -> Option<Vec<u8>> {
        self.state.read().entries.get(key).map(|v| v.value.clone())
    }

    /// Number of committed writes to `key`.
    pub fn history_len(&self, key: &str) -> usize {
        self.state.read().history.get(key).map_or(0, Vec::len)
    }

    /// Number of committed transactions.
    pub fn height(&self) -> u64 {
        self.state.read().height
    }

    /// History cursors currently open.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.faults.read().unavailable {
            return Err(StoreError::Unavailable(
                "ledger host marked unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn notify(&self, receipt: &CommitReceipt) {
        let observers = self.observers.read().clone();
        for observer in observers {
            observer.on_commit(receipt);
        }
    }
}

// =============================================================================
// TRANSACTION
// =============================================================================

/// One open transaction against an [`InMemoryLedger`].
///
/// Dropping it without calling [`commit`](Self::commit) discards every write.
pub struct LedgerTransaction<'a> {
    ledger: &'a InMemoryLedger,
    tx_id: String,
    timestamp: TxTimestamp,
    /// Committed version seen per key (`None` = key absent when read).
    read_set: HashMap<String, Option<u64>>,
    write_set: BTreeMap<String, Vec<u8>>,
}

impl LedgerTransaction<'_> {
    /// Keys written so far, sorted.
    pub fn pending_keys(&self) -> Vec<String> {
        self.write_set.keys().cloned().collect()
    }

    /// Validate the read set and apply every write atomically.
    pub fn commit(self) -> Result<CommitReceipt, StoreError> {
        let Self {
            ledger,
            tx_id,
            timestamp,
            read_set,
            write_set,
        } = self;

        let receipt = {
            let mut state = ledger.state.write();

            for (key, seen) in &read_set {
                let current = state.entries.get(key).map(|v| v.version);
                if current != *seen {
                    warn!(tx_id = %tx_id, key = %key, "MVCC read conflict, transaction rejected");
                    return Err(StoreError::Conflict { key: key.clone() });
                }
            }

            state.height += 1;
            let version = state.height;
            let keys_written: Vec<String> = write_set.keys().cloned().collect();

            for (key, value) in write_set {
                state.history.entry(key.clone()).or_default().push(KeyModification {
                    tx_id: tx_id.clone(),
                    timestamp,
                    value: value.clone(),
                });
                state.entries.insert(key, VersionedValue { value, version });
            }

            CommitReceipt {
                tx_id,
                timestamp,
                block_height: version,
                keys_written,
            }
        };

        debug!(
            tx_id = %receipt.tx_id,
            block_height = receipt.block_height,
            keys = receipt.keys_written.len(),
            "Transaction committed"
        );
        ledger.notify(&receipt);
        Ok(receipt)
    }
}

impl LedgerStub for LedgerTransaction<'_> {
    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.ledger.check_available()?;

        if let Some(pending) = self.write_set.get(key) {
            return Ok(Some(pending.clone()));
        }

        let state = self.ledger.state.read();
        let entry = state.entries.get(key);
        self.read_set
            .entry(key.to_string())
            .or_insert_with(|| entry.map(|v| v.version));
        Ok(entry.map(|v| v.value.clone()))
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.ledger.check_available()?;

        if self.ledger.faults.read().reject_writes.contains(key) {
            return Err(StoreError::WriteRejected {
                key: key.to_string(),
                reason: "rejected by fault plan".to_string(),
            });
        }

        self.write_set.insert(key.to_string(), value);
        Ok(())
    }

    fn get_history_for_key(&mut self, key: &str) -> Result<HistoryIter, StoreError> {
        self.ledger.check_available()?;

        let entries = self
            .ledger
            .state
            .read()
            .history
            .get(key)
            .cloned()
            .unwrap_or_default();
        let break_after = self.ledger.faults.read().break_history_after;

        Ok(Box::new(HistoryCursor {
            key: key.to_string(),
            entries: entries.into_iter(),
            yielded: 0,
            break_after,
            failed: false,
            _guard: CursorGuard::open(Arc::clone(&self.ledger.open_cursors)),
        }))
    }

    fn tx_timestamp(&self) -> TxTimestamp {
        self.timestamp
    }

    fn tx_id(&self) -> &str {
        &self.tx_id
    }
}

// =============================================================================
// HISTORY CURSOR
// =============================================================================

/// Counts open cursors; decrements on drop.
struct CursorGuard(Arc<AtomicUsize>);

impl CursorGuard {
    fn open(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

struct HistoryCursor {
    key: String,
    entries: std::vec::IntoIter<KeyModification>,
    yielded: usize,
    break_after: Option<usize>,
    failed: bool,
    _guard: CursorGuard,
}

impl Iterator for HistoryCursor {
    type Item = Result<KeyModification, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let exhausted = self.entries.as_slice().is_empty();
        if !exhausted && self.break_after.is_some_and(|limit| self.yielded >= limit) {
            self.failed = true;
            return Some(Err(StoreError::CursorFailed {
                key: self.key.clone(),
                reason: format!("cursor broke after {} entries", self.yielded),
            }));
        }
        let next = self.entries.next()?;
        self.yielded += 1;
        Some(Ok(next))
    }
}

// =============================================================================
// TESTS
// =============================================================================
