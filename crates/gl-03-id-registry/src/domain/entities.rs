//! # Registry Records

use serde::{Deserialize, Serialize};
use shared_types::Content;
use std::collections::BTreeMap;

/// Ledger key of the accepted identifier list.
pub const IDS_KEY: &str = "IDs";

/// Content field replaced by the transaction time at init.
pub const TIMESTAMP_FIELD: &str = "t";

/// Status written for every publisher at init.
pub const INITIAL_STATUS: &str = "Valid";

pub mod reference_ids {
    pub const RDSO: &str = "RDSO";
    pub const IPP: &str = "IPP";
}

/// Latest bookkeeping entry of one publisher.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GooseData {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Message")]
    pub content: Content,
    /// Free-form; the caller decides what it means.
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}

/// Publisher ids the registry writes at init and accepts in bookkeeping,
/// with their initial content.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryLayout {
    pub publishers: BTreeMap<String, Content>,
}

impl RegistryLayout {
    /// `RDSO` and `IPP` with the stock GOOSE placeholder content.
    #[must_use]
    pub fn reference() -> Self {
        use reference_ids::*;

        Self::default()
            .with_publisher(
                RDSO,
                Content::new()
                    .with(TIMESTAMP_FIELD, "")
                    .with("stNum", 0)
                    .with("allData", "TRUE"),
            )
            .with_publisher(
                IPP,
                Content::new()
                    .with(TIMESTAMP_FIELD, "")
                    .with("stNum", 0)
                    .with("allData", "FALSE"),
            )
    }

    #[must_use]
    pub fn with_publisher(mut self, id: impl Into<String>, initial: Content) -> Self {
        self.publishers.insert(id.into(), initial);
        self
    }

    #[must_use]
    pub fn is_publisher(&self, id: &str) -> bool {
        self.publishers.contains_key(id)
    }

    pub fn publisher_ids(&self) -> impl Iterator<Item = &str> {
        self.publishers.keys().map(String::as_str)
    }

    /// Init record for every publisher, stamped with `timestamp`.
    #[must_use]
    pub fn initial_records(&self, timestamp: &str) -> Vec<GooseData> {
        self.publishers
            .iter()
            .map(|(id, template)| {
                let mut content = template.clone();
                if content.contains_key(TIMESTAMP_FIELD) {
                    content.insert(TIMESTAMP_FIELD, timestamp);
                }
                GooseData {
                    id: id.clone(),
                    content,
                    status: INITIAL_STATUS.to_string(),
                    timestamp: timestamp.to_string(),
                }
            })
            .collect()
    }
}
