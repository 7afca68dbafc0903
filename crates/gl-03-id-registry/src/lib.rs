//! # gl-03-id-registry
//!
//! Identifier Registry subsystem: the bookkeeping variant of the exchange.
//! Instead of cross-validating content it keeps
//!
//! - one [`GooseData`] record per publisher, overwritten by
//!   [`IdRegistryService::book_keeping`] with whatever status the caller
//!   computed, and
//! - the `"IDs"` entry, a JSON array of accepted identifiers, checked by
//!   [`IdRegistryService::validate`] and replaced wholesale by
//!   [`IdRegistryService::update_ids`].

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::*;
pub use ports::*;
pub use service::IdRegistryService;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem identifier.
pub const SUBSYSTEM_ID: u8 = 3;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Identifier Registry";
