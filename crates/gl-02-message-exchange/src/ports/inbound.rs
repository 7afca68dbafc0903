//! # Driving Port (API - Inbound)
//!
//! The operation surface of the message exchange. Every call receives the
//! caller's transaction stub; whether that transaction is committed is the
//! caller's decision.

use crate::domain::{Message, Response, Status};
use gl_01_record_store::{HistoryRecord, LedgerStub};
use serde_json::Value;
use shared_types::{Content, CoreError};
use std::collections::BTreeMap;

pub trait MessageExchangeApi: Send + Sync {
    /// Write every publisher message and every response with their defaults.
    fn init_ledger(&self, stub: &mut dyn LedgerStub) -> Result<(), CoreError>;

    /// Overwrite a publisher's message content and type.
    fn update_message(
        &self,
        stub: &mut dyn LedgerStub,
        id: &str,
        content: Content,
        message_type: &str,
    ) -> Result<Message, CoreError>;

    /// Forward `published`, validate `subscribed` against the counterpart and
    /// store the verdict.
    fn respond_to_message(
        &self,
        stub: &mut dyn LedgerStub,
        response_id: &str,
        subscribed: Content,
        published: Content,
    ) -> Result<Status, CoreError>;

    fn validate_message(
        &self,
        stub: &mut dyn LedgerStub,
        message_id: &str,
        subscribed: &Content,
    ) -> Result<bool, CoreError>;

    fn read_data(&self, stub: &mut dyn LedgerStub, id: &str) -> Result<Value, CoreError>;

    fn read_message(&self, stub: &mut dyn LedgerStub, id: &str) -> Result<Message, CoreError>;

    fn read_response(&self, stub: &mut dyn LedgerStub, id: &str) -> Result<Response, CoreError>;

    fn get_all_data(&self, stub: &mut dyn LedgerStub) -> Result<BTreeMap<String, Value>, CoreError>;

    fn get_history(
        &self,
        stub: &mut dyn LedgerStub,
        id: &str,
    ) -> Result<Vec<HistoryRecord>, CoreError>;
}
