//! Message registry operations.

use super::MessageExchangeService;
use crate::domain::{Message, MessageType, Response};
use gl_01_record_store::{read_record, write_record, LedgerStub};
use shared_types::{Content, CoreError};
use tracing::{debug, info, instrument, warn};

impl MessageExchangeService {
    /// Write every publisher message (type `Standard`, tx time, initial
    /// content) and every response shell (status `Valid`).
    #[instrument(skip(self, stub), fields(tx_id = %stub.tx_id()))]
    pub fn init_ledger(&self, stub: &mut dyn LedgerStub) -> Result<(), CoreError> {
        let timestamp = stub.tx_timestamp().to_rfc3339();

        for id in self.topology.publishers.keys() {
            let content = self
                .topology
                .initial_content(id, &timestamp)
                .unwrap_or_default();
            let message = Message {
                id: id.clone(),
                content,
                timestamp: timestamp.clone(),
                message_type: MessageType::Standard,
            };
            write_record(stub, id, &message)?;
        }

        for response_id in self.topology.routes.keys() {
            write_record(stub, response_id, &Response::shell(response_id, &*timestamp))?;
        }

        info!(
            messages = self.topology.publishers.len(),
            responses = self.topology.routes.len(),
            %timestamp,
            "Ledger initialised"
        );
        Ok(())
    }

    /// Overwrite `id`'s content, timestamp and type.
    ///
    /// Checks, in order: `id` is a publisher, `message_type` is `Standard` or
    /// `Corrective`, the message exists.
    #[instrument(skip(self, stub, content), fields(tx_id = %stub.tx_id()))]
    pub fn update_message(
        &self,
        stub: &mut dyn LedgerStub,
        id: &str,
        content: Content,
        message_type: &str,
    ) -> Result<Message, CoreError> {
        self.ensure_publisher(id)?;
        let message_type = message_type.parse::<MessageType>().map_err(|e| {
            warn!(id, message_type, "Invalid message type");
            self.stats.write().rejected_inputs += 1;
            e
        })?;
        self.overwrite_message(stub, id, content, message_type)
    }

    pub(super) fn overwrite_message(
        &self,
        stub: &mut dyn LedgerStub,
        id: &str,
        content: Content,
        message_type: MessageType,
    ) -> Result<Message, CoreError> {
        let mut message: Message = read_record(stub, id)?;
        message.content = content;
        message.timestamp = stub.tx_timestamp().to_rfc3339();
        message.message_type = message_type;
        write_record(stub, id, &message)?;

        debug!(id, fields = message.content.len(), %message_type, "Message updated");
        Ok(message)
    }

    /// Compare `subscribed` against the stored content of publisher
    /// `message_id` under the configured match policy.
    #[instrument(skip(self, stub, subscribed), fields(tx_id = %stub.tx_id()))]
    pub fn validate_message(
        &self,
        stub: &mut dyn LedgerStub,
        message_id: &str,
        subscribed: &Content,
    ) -> Result<bool, CoreError> {
        self.ensure_publisher(message_id)?;
        let message: Message = read_record(stub, message_id)?;
        let matched = self
            .config
            .match_policy
            .matches(&message.content, subscribed);

        self.record_verdict(matched);
        info!(
            message_id,
            policy = %self.config.match_policy,
            matched,
            "Message validated"
        );
        Ok(matched)
    }

    #[instrument(skip(self, stub))]
    pub fn read_message(&self, stub: &mut dyn LedgerStub, id: &str) -> Result<Message, CoreError> {
        self.ensure_publisher(id)?;
        read_record(stub, id)
    }
}
