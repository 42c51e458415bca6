//! Orchard API library.
//!
//! This crate provides the storefront REST API as a library, allowing it to
//! be tested and reused. The binary in `main.rs` wires it to the network.
//!
//! # Architecture
//!
//! - Axum handlers in [`routes`], one module per aggregate
//! - PostgreSQL repositories in [`db`], one read-then-write round trip per
//!   document, transactional where an invariant spans rows
//! - Bearer-token authentication in [`services::token`] and
//!   [`middleware`], authorization in [`authz`]
//! - Every response is the `{status, message, data}` envelope from
//!   `orchard-core`

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod authz;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
