//! # Node Runtime
//!
//! Wires the ledger host, the hosted contract, the receipt channel and its
//! logger together.
//!
//! ## Startup Sequence
//!
//! 1. Build the hosted contract from configuration
//! 2. Create the ledger and register the broadcast observer
//! 3. Spawn the receipt logger
//! 4. Run `InitLedger` when `init_on_start` is set

use crate::config::NodeConfig;
use crate::events::{spawn_receipt_logger, BroadcastObserver};
use crate::router::{ContractRouter, HostedContract, InvocationError};
use gl_01_record_store::InMemoryLedger;
use gl_02_message_exchange::ExchangeError;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Contract(#[from] ExchangeError),

    #[error("ledger initialisation failed: {0}")]
    Init(#[from] InvocationError),
}

pub struct NodeRuntime {
    ledger: Arc<InMemoryLedger>,
    router: ContractRouter,
    observer: Arc<BroadcastObserver>,
    shutdown_tx: watch::Sender<bool>,
    logger: JoinHandle<u64>,
}

impl NodeRuntime {
    /// Build and start the runtime. Must be called inside a Tokio runtime.
    pub fn start(config: &NodeConfig) -> Result<Self, RuntimeError> {
        let contract = HostedContract::from_config(config)?;

        let ledger = Arc::new(InMemoryLedger::new());
        let observer = Arc::new(BroadcastObserver::new(config.events.channel_capacity));
        ledger.subscribe(observer.clone());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let logger = spawn_receipt_logger(observer.subscribe(), shutdown_rx);

        let router = ContractRouter::new(Arc::clone(&ledger), contract);
        info!(
            contract = %router.contract(),
            policy = %config.match_policy,
            "Node runtime started"
        );

        let runtime = Self {
            ledger,
            router,
            observer,
            shutdown_tx,
            logger,
        };

        if config.init_on_start {
            runtime.router.invoke("InitLedger", &[])?;
            info!("Ledger initialised on start");
        }
        Ok(runtime)
    }

    pub fn router(&self) -> &ContractRouter {
        &self.router
    }

    pub fn ledger(&self) -> &Arc<InMemoryLedger> {
        &self.ledger
    }

    /// Extra receiver on the receipt channel.
    pub fn subscribe_receipts(&self) -> broadcast::Receiver<gl_01_record_store::CommitReceipt> {
        self.observer.subscribe()
    }

    /// Stop the receipt logger once it has drained. Returns how many receipts
    /// it logged.
    pub async fn shutdown(self) -> u64 {
        info!("Initiating shutdown...");
        if self.shutdown_tx.send(true).is_err() {
            error!("Receipt logger already stopped");
        }
        match self.logger.await {
            Ok(logged) => {
                info!(receipts = logged, height = self.ledger.height(), "Shutdown complete");
                logged
            }
            Err(e) => {
                error!(error = %e, "Receipt logger task failed");
                0
            }
        }
    }
}
