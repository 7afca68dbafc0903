//! # Commit Observers

use crate::domain::CommitReceipt;
use crate::ports::CommitObserver;
use parking_lot::Mutex;

/// Keeps every receipt it is handed, in commit order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    receipts: Mutex<Vec<CommitReceipt>>,
}

impl RecordingObserver {
    pub fn receipts(&self) -> Vec<CommitReceipt> {
        self.receipts.lock().clone()
    }
}

impl CommitObserver for RecordingObserver {
    fn on_commit(&self, receipt: &CommitReceipt) {
        self.receipts.lock().push(receipt.clone());
    }
}
