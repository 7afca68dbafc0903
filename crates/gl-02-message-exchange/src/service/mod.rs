//! # Message Exchange Service
//!
//! Runs the exchange operations against a caller-supplied transaction stub.
//! The service holds only the immutable topology, the match policy and a few
//! counters, so one instance can serve any number of concurrent transactions.

mod messages;
mod queries;
mod responses;

#[cfg(test)]
mod tests;

use crate::domain::{ExchangeTopology, MatchPolicy, Message, Response, Status};
use crate::errors::ExchangeError;
use crate::ports::MessageExchangeApi;
use gl_01_record_store::{HistoryRecord, LedgerStub};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{Content, CoreError};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Service configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Applied to every validation this instance runs.
    pub match_policy: MatchPolicy,
}

/// Counters for operations run by this instance.
///
/// Counted when the operation finishes, whether or not the caller later
/// commits the transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServiceStats {
    pub validations: u64,
    pub valid_verdicts: u64,
    pub invalid_verdicts: u64,
    /// Calls refused for an unknown id or message type.
    pub rejected_inputs: u64,
}

pub struct MessageExchangeService {
    topology: ExchangeTopology,
    config: ExchangeConfig,
    stats: RwLock<ServiceStats>,
}

impl MessageExchangeService {
    pub fn new(topology: ExchangeTopology, config: ExchangeConfig) -> Result<Self, ExchangeError> {
        topology.validate()?;
        info!(
            publishers = topology.publishers.len(),
            routes = topology.routes.len(),
            policy = %config.match_policy,
            "Message exchange ready"
        );
        Ok(Self {
            topology,
            config,
            stats: RwLock::new(ServiceStats::default()),
        })
    }

    #[must_use]
    pub fn topology(&self) -> &ExchangeTopology {
        &self.topology
    }

    #[must_use]
    pub fn config(&self) -> ExchangeConfig {
        self.config
    }

    #[must_use]
    pub fn stats(&self) -> ServiceStats {
        *self.stats.read()
    }

    fn ensure_publisher(&self, id: &str) -> Result<(), CoreError> {
        if self.topology.is_publisher(id) {
            return Ok(());
        }
        warn!(id, "Unknown message ID");
        self.stats.write().rejected_inputs += 1;
        Err(CoreError::invalid_message_id(id))
    }

    fn ensure_known(&self, id: &str) -> Result<(), CoreError> {
        if self.topology.is_known(id) {
            return Ok(());
        }
        warn!(id, "Unknown record ID");
        self.stats.write().rejected_inputs += 1;
        Err(CoreError::invalid_record_id(id))
    }

    fn record_verdict(&self, matched: bool) {
        let mut stats = self.stats.write();
        stats.validations += 1;
        if matched {
            stats.valid_verdicts += 1;
        } else {
            stats.invalid_verdicts += 1;
        }
    }
}

// =============================================================================
// PORT IMPLEMENTATION
// =============================================================================

impl MessageExchangeApi for MessageExchangeService {
    fn init_ledger(&self, stub: &mut dyn LedgerStub) -> Result<(), CoreError> {
        MessageExchangeService::init_ledger(self, stub)
    }

    fn update_message(
        &self,
        stub: &mut dyn LedgerStub,
        id: &str,
        content: Content,
        message_type: &str,
    ) -> Result<Message, CoreError> {
        MessageExchangeService::update_message(self, stub, id, content, message_type)
    }

    fn respond_to_message(
        &self,
        stub: &mut dyn LedgerStub,
        response_id: &str,
        subscribed: Content,
        published: Content,
    ) -> Result<Status, CoreError> {
        MessageExchangeService::respond_to_message(self, stub, response_id, subscribed, published)
    }

    fn validate_message(
        &self,
        stub: &mut dyn LedgerStub,
        message_id: &str,
        subscribed: &Content,
    ) -> Result<bool, CoreError> {
        MessageExchangeService::validate_message(self, stub, message_id, subscribed)
    }

    fn read_data(&self, stub: &mut dyn LedgerStub, id: &str) -> Result<Value, CoreError> {
        MessageExchangeService::read_data(self, stub, id)
    }

    fn read_message(&self, stub: &mut dyn LedgerStub, id: &str) -> Result<Message, CoreError> {
        MessageExchangeService::read_message(self, stub, id)
    }

    fn read_response(&self, stub: &mut dyn LedgerStub, id: &str) -> Result<Response, CoreError> {
        MessageExchangeService::read_response(self, stub, id)
    }

    fn get_all_data(&self, stub: &mut dyn LedgerStub) -> Result<BTreeMap<String, Value>, CoreError> {
        MessageExchangeService::get_all_data(self, stub)
    }

    fn get_history(
        &self,
        stub: &mut dyn LedgerStub,
        id: &str,
    ) -> Result<Vec<HistoryRecord>, CoreError> {
        MessageExchangeService::get_history(self, stub, id)
    }
}
