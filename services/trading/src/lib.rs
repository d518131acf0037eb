//! Session trading engine
//!
//! The core of the stock-trading simulation backend: the dual-store
//! transactional protocol that keeps the durable session row and the
//! volatile holdings ledger consistent under concurrent trades, plus the
//! trading operations themselves and the one-shot crafting pipeline that
//! produces a session's five-week scenario.
//!
//! Store technology is abstracted behind contracts; in-memory
//! implementations back the tests and the development server.

pub mod catalog;
pub mod coordinator;
pub mod crafting;
pub mod memory;
pub mod scenario;
pub mod service;
pub mod store;
pub mod tasks;
pub mod week_data;
