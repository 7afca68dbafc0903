//! # Domain Layer
//!
//! Pure types and rules. Nothing here touches the ledger.

pub mod entities;
pub mod matching;
pub mod topology;

pub use entities::*;
pub use matching::*;
pub use topology::*;
