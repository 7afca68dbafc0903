//! # gl-02-message-exchange
//!
//! Message Exchange subsystem: the publish / respond / cross-validate state
//! machine two counterparties run over the record store.
//!
//! ## Role in System
//!
//! - **Message Registry**: one [`Message`] per publisher id, created at init and
//!   overwritten in place by [`MessageExchangeService::update_message`].
//! - **Cross-Validator**: [`MessageExchangeService::respond_to_message`]
//!   forwards the responder's published content into its own message, then
//!   checks what the responder claims it received against the *counterpart*
//!   message and stores the verdict in a [`Response`].
//! - **Topology**: which response id updates which message and validates
//!   against which is data ([`ExchangeTopology`]), not branching.
//!
//! ## Respond Flow
//!
//! ```text
//! respond_to_message(resp_id, subscribed, published)
//!     │
//!     ├─ route = topology[resp_id]            (else InvalidIdentifier)
//!     ├─ Message[route.updates] ← published   (else NotFound / HostFailure)
//!     ├─ Response[resp_id] loaded or shell
//!     ├─ verdict = policy.matches(Message[route.validates_against], subscribed)
//!     └─ Response[resp_id] ← (subscribed, published, tx time, verdict)
//! ```
//!
//! Every operation runs against one `&mut dyn LedgerStub` and never commits;
//! the caller's transaction either applies all of it or none of it.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

pub use domain::*;
pub use errors::*;
pub use ports::*;
pub use service::{ExchangeConfig, MessageExchangeService, ServiceStats};

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for contract callers.
pub mod prelude {
    pub use crate::domain::{
        ExchangeTopology, MatchPolicy, Message, MessageType, Response, ResponseRoute, Status,
    };
    pub use crate::errors::ExchangeError;
    pub use crate::ports::MessageExchangeApi;
    pub use crate::service::{ExchangeConfig, MessageExchangeService};
    pub use shared_types::{Content, CoreError};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem identifier.
pub const SUBSYSTEM_ID: u8 = 2;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Message Exchange";
