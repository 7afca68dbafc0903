//! # Ports Layer
//!
//! - **Driven Ports (Outbound)**: `LedgerStub` (the host), `TimeSource`,
//!   `CommitObserver`
//! - No concrete implementations in this module

pub mod outbound;

pub use outbound::*;
