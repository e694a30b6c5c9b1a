//! # Order engine public API
//!
//! The `pos_api` module exposes the programmatic API of the order engine. Each API object is created by supplying a
//! storage backend that implements the traits it needs, so different parts can be wired to different backends.
//!
//! * [`order_ledger`] validates and atomically commits new orders against the catalog's stock levels.
//! * [`lifecycle_api`] drives orders through their status lifecycle and broadcasts every change to live-view
//!   subscribers.
//! * [`catalog_api`] provides product and category management.
//!
//! # API usage
//!
//! ```rust,ignore
//! use pos_order_engine::{events::StatusEventBus, OrderLifecycleApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/pos_store.db", 10).await?;
//! let bus = StatusEventBus::new(64);
//! let api = OrderLifecycleApi::new(db, bus);
//! let order = api.submit_order(new_order).await?;
//! ```
pub mod catalog_api;
pub mod lifecycle_api;
pub mod order_ledger;
