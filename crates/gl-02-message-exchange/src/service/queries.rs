//! Read-only queries over any known id.

use super::MessageExchangeService;
use gl_01_record_store::{read_history, read_value, HistoryRecord, LedgerStub};
use serde_json::Value;
use shared_types::CoreError;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

impl MessageExchangeService {
    /// Stored JSON of a message or response.
    #[instrument(skip(self, stub))]
    pub fn read_data(&self, stub: &mut dyn LedgerStub, id: &str) -> Result<Value, CoreError> {
        self.ensure_known(id)?;
        read_value(stub, id)
    }

    /// Every known id mapped to its stored JSON. The first missing or corrupt
    /// id aborts the whole read.
    #[instrument(skip(self, stub))]
    pub fn get_all_data(
        &self,
        stub: &mut dyn LedgerStub,
    ) -> Result<BTreeMap<String, Value>, CoreError> {
        let mut all = BTreeMap::new();
        for id in self.topology.known_ids() {
            all.insert(id.to_string(), read_value(stub, id)?);
        }
        debug!(records = all.len(), "All data read");
        Ok(all)
    }

    /// Committed snapshots of a known id, oldest first.
    #[instrument(skip(self, stub))]
    pub fn get_history(
        &self,
        stub: &mut dyn LedgerStub,
        id: &str,
    ) -> Result<Vec<HistoryRecord>, CoreError> {
        self.ensure_known(id)?;
        read_history(stub, id)
    }
}
