//! # POS order server
//! This crate hosts the HTTP server for the POS order engine. It is responsible for:
//! * Exposing the product catalog to point-of-sale clients.
//! * Accepting new orders and committing them atomically against the catalog.
//! * Applying order status changes on behalf of kitchen and counter staff.
//! * Streaming every order status change to connected live displays as Server-Sent Events.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that reports the number of live subscribers.
//! * `/products`, `/products/{id}` and `/categories`: Catalog queries and maintenance.
//! * `/orders`, `/orders/{id}`, `/orders/table/{table_no}`: Order intake and queries.
//! * `/orders/{id}/status`: Order status transitions.
//! * `/orders/updates`: The live order status stream.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;
pub mod sse;

#[cfg(test)]
mod endpoint_tests;
