//! # Ports Layer
//!
//! - `inbound`: the operation surface a gateway drives.
//!
//! The outbound side is the record store's `LedgerStub`.

pub mod inbound;

pub use inbound::*;
