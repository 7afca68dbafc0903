//! # Adapters Layer (Outer Hexagon)
//!
//! - `memory`: in-memory ledger host (transactions, MVCC, history)
//! - `time`: wall-clock and deterministic time sources
//! - `observer`: commit observer that records receipts

pub mod memory;
pub mod observer;
pub mod time;

pub use memory::*;
pub use observer::*;
pub use time::*;
