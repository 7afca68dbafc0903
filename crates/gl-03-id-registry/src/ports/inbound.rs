//! # Driving Port (API - Inbound)

use crate::domain::GooseData;
use gl_01_record_store::{HistoryRecord, LedgerStub};
use serde_json::Value;
use shared_types::{Content, CoreError};
use std::collections::BTreeMap;

/// Operation surface of the bookkeeping contract.
pub trait IdRegistryApi: Send + Sync {
    fn init_ledger(&self, stub: &mut dyn LedgerStub) -> Result<(), CoreError>;

    /// Is `id` in the stored identifier list?
    fn validate(&self, stub: &mut dyn LedgerStub, id: &str) -> Result<bool, CoreError>;

    /// Replace the identifier list. No merge.
    fn update_ids(&self, stub: &mut dyn LedgerStub, ids: Vec<String>) -> Result<(), CoreError>;

    fn book_keeping(
        &self,
        stub: &mut dyn LedgerStub,
        id: &str,
        content: Content,
        status: &str,
    ) -> Result<GooseData, CoreError>;

    /// Stored JSON text of any key.
    fn read(&self, stub: &mut dyn LedgerStub, id: &str) -> Result<String, CoreError>;

    fn get_state(&self, stub: &mut dyn LedgerStub) -> Result<BTreeMap<String, Value>, CoreError>;

    fn get_history(
        &self,
        stub: &mut dyn LedgerStub,
        id: &str,
    ) -> Result<Vec<HistoryRecord>, CoreError>;
}
