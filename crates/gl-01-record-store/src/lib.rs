//! # gl-01-record-store
//!
//! Record Store subsystem: the only layer that talks to the ledger host.
//!
//! ## Role in System
//!
//! - **Host Port**: [`LedgerStub`] is the get/put/history/timestamp surface a
//!   contract operation runs against. One stub = one ledger transaction.
//! - **Typed Codec**: [`codec`] maps absent keys to `NotFound` and unparsable
//!   bytes to `Corrupt`, so contracts never touch raw bytes.
//! - **Audit Reader**: [`history::read_history`] replays a key's change log.
//! - **Reference Host**: [`InMemoryLedger`] gives transactions with
//!   read-your-writes, optimistic concurrency on commit and per-key history.
//!
//! ## Transaction Flow
//!
//! ```text
//! caller ──submit(op)──→ InMemoryLedger::begin ──→ LedgerTransaction
//!                                                     │ op(&mut dyn LedgerStub)
//!                                     Ok ─────────────┤───────────── Err
//!                                     ↓                               ↓
//!                        commit: check read set               drop: no effect
//!                        apply writes, append history
//!                                     ↓
//!                        CommitObserver::on_commit
//! ```

pub mod adapters;
pub mod codec;
pub mod domain;
pub mod history;
pub mod ports;

pub use adapters::*;
pub use codec::*;
pub use domain::*;
pub use history::*;
pub use ports::*;
