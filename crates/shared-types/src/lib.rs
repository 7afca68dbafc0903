//! # Shared Types Crate
//!
//! Types shared by the record store, the message exchange contract and the
//! identifier registry contract.
//!
//! ## Contents
//!
//! - [`Content`]: the open payload published by a party. Keys are sorted, so
//!   two documents with the same entries encode to the same JSON bytes.
//! - [`TxTimestamp`]: the ledger transaction time, `(seconds, nanos)`.
//! - [`CoreError`] / [`StoreError`]: the failure taxonomy. Every operation
//!   surfaces the first failure and performs no further writes.

pub mod content;
pub mod errors;
pub mod timestamp;

pub use content::*;
pub use errors::*;
pub use timestamp::*;
