//! Orchard Core - Shared types library.
//!
//! This crate provides common types used across all Orchard components:
//! - `api` - The REST API server
//! - `integration-tests` - Cross-crate tests
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails, plus the
//!   uniform response envelope every endpoint speaks.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
