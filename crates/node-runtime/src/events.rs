//! # Post-Commit Events
//!
//! Commit receipts fan out on a `tokio::sync::broadcast` channel. The ledger
//! calls [`BroadcastObserver::on_commit`] after a commit has been applied;
//! subscribers only watch and cannot influence the transaction.

use gl_01_record_store::{CommitObserver, CommitReceipt};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Commit observer that republishes every receipt on a broadcast channel.
#[derive(Clone, Debug)]
pub struct BroadcastObserver {
    sender: broadcast::Sender<CommitReceipt>,
}

impl BroadcastObserver {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CommitReceipt> {
        self.sender.subscribe()
    }
}

impl CommitObserver for BroadcastObserver {
    fn on_commit(&self, receipt: &CommitReceipt) {
        // Err only means nobody is listening.
        if self.sender.send(receipt.clone()).is_err() {
            debug!(tx_id = %receipt.tx_id, "No receipt subscribers");
        }
    }
}

/// Log every receipt until `shutdown` flips, then drain what is buffered.
/// Resolves to the number of receipts logged.
pub fn spawn_receipt_logger(
    mut receipts: broadcast::Receiver<CommitReceipt>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut logged = 0u64;
        loop {
            tokio::select! {
                received = receipts.recv() => match received {
                    Ok(receipt) => {
                        log_receipt(&receipt);
                        logged += 1;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Receipt logger fell behind");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = shutdown.changed() => {
                    loop {
                        match receipts.try_recv() {
                            Ok(receipt) => {
                                log_receipt(&receipt);
                                logged += 1;
                            }
                            Err(TryRecvError::Lagged(skipped)) => {
                                warn!(skipped, "Receipt logger fell behind");
                            }
                            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                        }
                    }
                    break;
                }
            }
        }
        debug!(logged, "Receipt logger stopped");
        logged
    })
}

fn log_receipt(receipt: &CommitReceipt) {
    info!(
        tx_id = %receipt.tx_id,
        height = receipt.block_height,
        timestamp = %receipt.timestamp,
        keys = ?receipt.keys_written,
        "Transaction committed"
    );
}
