//! # Message Exchange Errors
//!
//! Operation failures use [`shared_types::CoreError`] directly. This module
//! only adds what can go wrong while building the service.

use thiserror::Error;

/// Construction-time errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExchangeError {
    /// The publisher/route table is not usable.
    #[error("invalid exchange topology: {0}")]
    InvalidTopology(String),

    /// A match policy name that is neither `coverage` nor `canonical`.
    #[error("unknown match policy: {0}")]
    UnknownPolicy(String),
}
