//! POS Order Engine
//!
//! The order engine takes orders from point-of-sale clients, commits them atomically against the product catalog,
//! and broadcasts every order status change to live kitchen and counter displays.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@db`]). SQLite is the supported backend. You should never need to access
//!    the database directly. Instead, use the public API provided by the engine. The exception is the data types used
//!    in the database. These are defined in the `db_types` module and are public.
//! 2. Live status broadcasting ([`mod@events`]). An in-process event bus with one bounded queue and one delivery task
//!    per connected subscriber.
//! 3. The engine public API ([`mod@pos_api`]). This provides the order ledger, the order lifecycle controller and
//!    catalog management. Storage backends implement the traits in [`traits`] in order to back these APIs.
mod db;

pub mod db_types;
pub mod events;
mod pos_api;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{DatabaseOptions, SqliteDatabase, SqliteDatabaseError};
pub use db::traits;
pub use pos_api::{catalog_api::CatalogApi, lifecycle_api::OrderLifecycleApi, order_ledger::OrderLedger};
pub use traits::{CatalogManagement, OrderFlowError, OrderLedgerDatabase};
