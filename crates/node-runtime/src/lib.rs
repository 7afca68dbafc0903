//! # Node Runtime Library
//!
//! Everything the `node-runtime` binary is made of, exposed for tests.
//!
//! - `config` - `NodeConfig` from defaults, file and `GL_*` environment
//! - `logging` - global `tracing` subscriber
//! - `events` - post-commit receipt broadcast and its logger task
//! - `router` - function name + string args to contract operation
//! - `driver` - JSON-lines script loop
//! - `runtime` - startup and shutdown wiring

#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod driver;
pub mod events;
pub mod logging;
pub mod router;
pub mod runtime;

pub use config::{ContractKind, NodeConfig};
pub use driver::{run_script, CallOutcome, ScriptCall, ScriptSummary};
pub use router::{ContractRouter, HostedContract, Invocation, InvocationError, TxMode};
pub use runtime::NodeRuntime;
