//! # Identifier Registry Service
//!
//! `read` and `get_history` accept any ledger key, as the deployed gateway
//! uses them to inspect entries written by other contracts. `book_keeping`
//! only accepts the configured publishers.


use crate::domain::{GooseData, RegistryLayout, IDS_KEY};
use crate::ports::IdRegistryApi;
use gl_01_record_store::{
    read_history, read_raw, read_record, read_value, write_record, HistoryRecord, LedgerStub,
};
use serde_json::Value;
use shared_types::{Content, CoreError};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

pub struct IdRegistryService {
    layout: RegistryLayout,
}

impl IdRegistryService {
    pub fn new(layout: RegistryLayout) -> Self {
        info!(publishers = layout.publishers.len(), "Identifier registry ready");
        Self { layout }
    }

    #[must_use]
    pub fn layout(&self) -> &RegistryLayout {
        &self.layout
    }

    fn stored_ids(stub: &mut dyn LedgerStub) -> Result<Vec<String>, CoreError> {
        read_record(stub, IDS_KEY)
    }
}

impl IdRegistryApi for IdRegistryService {
    /// Write a `Valid` record for every publisher, then the publisher list
    /// as `"IDs"`.
    #[instrument(skip(self, stub), fields(tx_id = %stub.tx_id()))]
    fn init_ledger(&self, stub: &mut dyn LedgerStub) -> Result<(), CoreError> {
        let timestamp = stub.tx_timestamp().to_rfc3339();
        for record in self.layout.initial_records(&timestamp) {
            write_record(stub, &record.id, &record)?;
        }

        let ids: Vec<&str> = self.layout.publisher_ids().collect();
        write_record(stub, IDS_KEY, &ids)?;

        info!(ids = ?ids, %timestamp, "Registry initialised");
        Ok(())
    }

    #[instrument(skip(self, stub))]
    fn validate(&self, stub: &mut dyn LedgerStub, id: &str) -> Result<bool, CoreError> {
        let ids = Self::stored_ids(stub)?;
        let accepted = ids.iter().any(|known| known == id);
        info!(id, accepted, "Identifier checked");
        Ok(accepted)
    }

    #[instrument(skip(self, stub), fields(tx_id = %stub.tx_id()))]
    fn update_ids(&self, stub: &mut dyn LedgerStub, ids: Vec<String>) -> Result<(), CoreError> {
        write_record(stub, IDS_KEY, &ids)?;
        info!(count = ids.len(), "Identifier list replaced");
        Ok(())
    }

    /// Overwrite `id`'s record with `content`, the tx time and `status`.
    #[instrument(skip(self, stub, content), fields(tx_id = %stub.tx_id()))]
    fn book_keeping(
        &self,
        stub: &mut dyn LedgerStub,
        id: &str,
        content: Content,
        status: &str,
    ) -> Result<GooseData, CoreError> {
        if !self.layout.is_publisher(id) {
            warn!(id, "Unknown bookkeeping ID");
            return Err(CoreError::invalid_record_id(id));
        }

        let record = GooseData {
            id: id.to_string(),
            content,
            status: status.to_string(),
            timestamp: stub.tx_timestamp().to_rfc3339(),
        };
        write_record(stub, id, &record)?;
        debug!(id, status, "Bookkeeping record written");
        Ok(record)
    }

    #[instrument(skip(self, stub))]
    fn read(&self, stub: &mut dyn LedgerStub, id: &str) -> Result<String, CoreError> {
        let bytes = read_raw(stub, id)?;
        String::from_utf8(bytes).map_err(|e| CoreError::Corrupt {
            key: id.to_string(),
            reason: e.to_string(),
        })
    }

    /// Every publisher record plus `"IDs"`; the first missing or unparsable
    /// entry aborts.
    #[instrument(skip(self, stub))]
    fn get_state(&self, stub: &mut dyn LedgerStub) -> Result<BTreeMap<String, Value>, CoreError> {
        let mut state = BTreeMap::new();
        for id in self.layout.publisher_ids().chain([IDS_KEY]) {
            state.insert(id.to_string(), read_value(stub, id)?);
        }
        Ok(state)
    }

    #[instrument(skip(self, stub))]
    fn get_history(
        &self,
        stub: &mut dyn LedgerStub,
        id: &str,
    ) -> Result<Vec<HistoryRecord>, CoreError> {
        read_history(stub, id)
    }
}
