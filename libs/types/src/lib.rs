//! Types library for the stock-trading simulation backend
//!
//! This library provides all core type definitions shared across the backend
//! services: the session and its status state machine, the per-session
//! holdings ledger, weekly market data, catalog entities, and the error
//! taxonomy.
//!
//! # Modules
//! - `token`: opaque session bearer tokens
//! - `status`: session status state machine
//! - `session`: session record and state views
//! - `ledger`: holdings ledger with average-cost accounting
//! - `week`: per-week market data and quotes
//! - `catalog`: instrument and category entities
//! - `errors`: error taxonomy

pub mod catalog;
pub mod errors;
pub mod ledger;
pub mod session;
pub mod status;
pub mod token;
pub mod week;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::catalog::*;
    pub use crate::errors::*;
    pub use crate::ledger::*;
    pub use crate::session::*;
    pub use crate::status::*;
    pub use crate::token::*;
    pub use crate::week::*;
}
