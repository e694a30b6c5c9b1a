//! #  Storage contracts
//!
//! This module defines the interface contracts that storage *backends* must satisfy in order to back the order
//! engine. The engine only ever talks to storage through these traits, so a backend is injected into each API
//! object rather than being reachable as a process-wide handle.
//!
//! ## Traits
//!
//! * [`OrderLedgerDatabase`] is the transactional heart of the engine. A backend must commit an order header, its line
//!   items and the matching stock decrements as one atomic unit, and must apply status changes as single-row atomic
//!   updates.
//! * [`CatalogManagement`] provides typed read/write access to the product catalog.
//!
//! Both traits report failures using the [`OrderFlowError`] taxonomy so that callers can tell a business-rule
//! rejection from a transient storage fault.
mod catalog_management;
mod errors;
mod order_ledger_database;

pub use catalog_management::CatalogManagement;
pub use errors::OrderFlowError;
pub use order_ledger_database::{OrderLedgerDatabase, StatusChange};
