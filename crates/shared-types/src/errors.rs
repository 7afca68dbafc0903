//! # Error Types
//!
//! Failure taxonomy shared by the ledger-facing crates.
//!
//! `StoreError` is what the ledger host reports. `CoreError` is what a core
//! operation reports to its caller; host failures are carried inside
//! `CoreError::HostFailure`.

use std::fmt;
use thiserror::Error;

/// Errors reported by the ledger host (or the record store adapter over it).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A key read by the transaction changed before commit (MVCC read conflict).
    #[error("read conflict on {key}: version changed before commit")]
    Conflict { key: String },

    /// The host could not be reached or refused the call.
    #[error("ledger host unavailable: {0}")]
    Unavailable(String),

    /// A history cursor failed mid-iteration.
    #[error("history cursor for {key} failed: {reason}")]
    CursorFailed { key: String, reason: String },

    /// The host rejected a write.
    #[error("write to {key} rejected: {reason}")]
    WriteRejected { key: String, reason: String },
}

/// Which closed identifier set an id was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    /// Publisher message ids (`RDSO_PubMessage`, ...).
    Message,
    /// Response ids (`RDSO_ValidationMessage`, ...).
    Response,
    /// Any id the contract knows about (messages, responses, bookkeeping records).
    Record,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message => f.write_str("message"),
            Self::Response => f.write_str("response"),
            Self::Record => f.write_str("record"),
        }
    }
}

/// Errors reported by core operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The id is not in the closed set for this operation.
    #[error("invalid {kind} ID: {id}")]
    InvalidIdentifier { kind: IdentifierKind, id: String },

    /// The message type is not `Standard` or `Corrective`.
    #[error("invalid message type: {0}")]
    InvalidType(String),

    /// An expected ledger entry is absent.
    #[error("{key} does not exist")]
    NotFound { key: String },

    /// Stored bytes do not parse into the expected shape.
    #[error("stored record {key} is corrupt: {reason}")]
    Corrupt { key: String, reason: String },

    /// A record could not be serialized for writing.
    #[error("cannot encode record {key}: {reason}")]
    Encode { key: String, reason: String },

    /// The ledger host itself failed.
    #[error("ledger host failure: {0}")]
    HostFailure(#[from] StoreError),
}

impl CoreError {
    /// Stable label for the error class, used in gateway responses and logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier { .. } => "InvalidIdentifier",
            Self::InvalidType(_) => "InvalidType",
            Self::NotFound { .. } => "NotFound",
            Self::Corrupt { .. } => "Corrupt",
            Self::Encode { .. } => "Encode",
            Self::HostFailure(_) => "HostFailure",
        }
    }

    pub fn invalid_message_id(id: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            kind: IdentifierKind::Message,
            id: id.into(),
        }
    }

    pub fn invalid_response_id(id: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            kind: IdentifierKind::Response,
            id: id.into(),
        }
    }

    pub fn invalid_record_id(id: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            kind: IdentifierKind::Record,
            id: id.into(),
        }
    }
}
