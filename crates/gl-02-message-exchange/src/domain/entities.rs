//! # Ledger Records
//!
//! The two record shapes stored by the exchange. Field names on the wire are
//! the ones every deployed gateway already reads (`ID`, `Message`, ...), and
//! fields are declared in sorted order so the stored JSON is canonical.

use serde::{Deserialize, Serialize};
use shared_types::{Content, CoreError};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// MESSAGE
// =============================================================================

/// Informational flag on a message update. Both kinds validate the same way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    #[default]
    Standard,
    Corrective,
}

impl MessageType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Corrective => "Corrective",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = CoreError;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Standard" => Ok(Self::Standard),
            "Corrective" => Ok(Self::Corrective),
            other => Err(CoreError::InvalidType(other.to_string())),
        }
    }
}

/// One party's latest published assertion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Message")]
    pub content: Content,
    /// Transaction time of the last write, RFC 3339.
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Type")]
    pub message_type: MessageType,
}

// =============================================================================
// RESPONSE
// =============================================================================

/// Outcome of the most recent cross-validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Valid,
    Invalid,
}

impl Status {
    #[must_use]
    pub fn from_verdict(matched: bool) -> Self {
        if matched {
            Self::Valid
        } else {
            Self::Invalid
        }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("Valid"),
            Self::Invalid => f.write_str("Invalid"),
        }
    }
}

/// A responder's claim about the counterpart's message, plus the verdict.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "ID")]
    pub id: String,
    /// What the responder is publishing now.
    #[serde(rename = "Published")]
    pub published: Content,
    #[serde(rename = "Status")]
    pub status: Status,
    /// What the responder claims it received.
    #[serde(rename = "Subscribed")]
    pub subscribed: Content,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}

impl Response {
    /// Empty response with a `Valid` status, as written at init and as assumed
    /// when a response id has never been written.
    pub fn shell(id: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            published: Content::new(),
            status: Status::Valid,
            subscribed: Content::new(),
            timestamp: timestamp.into(),
        }
    }
}
