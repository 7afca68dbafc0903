//! # Exchange Topology
//!
//! The static table the cross-validator runs on: which publisher ids exist
//! (with their initial content) and, for each response id, which message a
//! response updates and which message it validates against.

use crate::errors::ExchangeError;
use serde::{Deserialize, Serialize};
use shared_types::Content;
use std::collections::BTreeMap;
use tracing::warn;

/// Content field replaced by the transaction time when a publisher is
/// initialised.
pub const TIMESTAMP_FIELD: &str = "t";

pub mod reference_ids {
    pub const RDSO_PUB_MESSAGE: &str = "RDSO_PubMessage";
    pub const IPP_PUB_MESSAGE: &str = "IPP_PubMessage";
    pub const RDSO_VALIDATION_MESSAGE: &str = "RDSO_ValidationMessage";
    pub const IPP_VALIDATION_MESSAGE: &str = "IPP_ValidationMessage";
}

/// Where a response id forwards its published content and what it checks its
/// subscribed content against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRoute {
    pub updates: String,
    pub validates_against: String,
}

impl ResponseRoute {
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.updates == self.validates_against
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeTopology {
    /// Publisher id -> content written at init.
    pub publishers: BTreeMap<String, Content>,
    /// Response id -> route.
    pub routes: BTreeMap<String, ResponseRoute>,
}

impl ExchangeTopology {
    /// The two-party RDSO/IPP exchange.
    #[must_use]
    pub fn reference() -> Self {
        use reference_ids::*;

        Self::default()
            .with_publisher(
                RDSO_PUB_MESSAGE,
                Content::new()
                    .with(TIMESTAMP_FIELD, "")
                    .with("stNum", 0)
                    .with("allData", "TRUE"),
            )
            .with_publisher(
                IPP_PUB_MESSAGE,
                Content::new()
                    .with(TIMESTAMP_FIELD, "")
                    .with("stNum", 0)
                    .with("allData", "FALSE"),
            )
            .with_route(RDSO_VALIDATION_MESSAGE, RDSO_PUB_MESSAGE, IPP_PUB_MESSAGE)
            .with_route(IPP_VALIDATION_MESSAGE, IPP_PUB_MESSAGE, RDSO_PUB_MESSAGE)
    }

    #[must_use]
    pub fn with_publisher(mut self, id: impl Into<String>, initial: Content) -> Self {
        self.publishers.insert(id.into(), initial);
        self
    }

    #[must_use]
    pub fn with_route(
        mut self,
        response_id: impl Into<String>,
        updates: impl Into<String>,
        validates_against: impl Into<String>,
    ) -> Self {
        self.routes.insert(
            response_id.into(),
            ResponseRoute {
                updates: updates.into(),
                validates_against: validates_against.into(),
            },
        );
        self
    }

    /// Check the table is usable.
    ///
    /// Rejects an empty publisher set, routes naming unknown publishers, ids
    /// used both as publisher and response, and two responses updating the
    /// same publisher. A route whose two targets are the same publisher is
    /// accepted with a warning.
    pub fn validate(&self) -> Result<(), ExchangeError> {
        if self.publishers.is_empty() {
            return Err(ExchangeError::InvalidTopology(
                "at least one publisher is required".into(),
            ));
        }

        let mut updated_by: BTreeMap<&str, &str> = BTreeMap::new();
        for (response_id, route) in &self.routes {
            if self.publishers.contains_key(response_id) {
                return Err(ExchangeError::InvalidTopology(format!(
                    "{response_id} is both a publisher and a response id"
                )));
            }
            for target in [&route.updates, &route.validates_against] {
                if !self.publishers.contains_key(target) {
                    return Err(ExchangeError::InvalidTopology(format!(
                        "route {response_id} targets unknown publisher {target}"
                    )));
                }
            }
            if let Some(first) = updated_by.insert(&route.updates, response_id) {
                return Err(ExchangeError::InvalidTopology(format!(
                    "{first} and {response_id} both update {}",
                    route.updates
                )));
            }
            if route.is_degenerate() {
                warn!(
                    response_id = %response_id,
                    publisher = %route.updates,
                    "Route validates against the message it updates"
                );
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn is_publisher(&self, id: &str) -> bool {
        self.publishers.contains_key(id)
    }

    #[must_use]
    pub fn route(&self, response_id: &str) -> Option<&ResponseRoute> {
        self.routes.get(response_id)
    }

    #[must_use]
    pub fn is_known(&self, id: &str) -> bool {
        self.is_publisher(id) || self.routes.contains_key(id)
    }

    /// Publisher ids, then response ids.
    pub fn known_ids(&self) -> impl Iterator<Item = &str> {
        self.publishers
            .keys()
            .chain(self.routes.keys())
            .map(String::as_str)
    }

    /// Initial content for `id` with the timestamp field stamped.
    #[must_use]
    pub fn initial_content(&self, id: &str, timestamp: &str) -> Option<Content> {
        let mut content = self.publishers.get(id)?.clone();
        if content.contains_key(TIMESTAMP_FIELD) {
            content.insert(TIMESTAMP_FIELD, timestamp);
        }
        Some(content)
    }
}
