//! Integration tests for Orchard.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p orchard-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `api_envelope` - Response envelope and pagination contract
//! - `authorization` - Bearer tokens and the ownership/role gate
//! - `order_totals` - Order placement arithmetic checks
//! - `catalog` - Rating aggregation and catalog rules
//!
//! The tests here exercise the crates' public APIs without a database or a
//! running server; end-to-end tests against a live `PostgreSQL` instance run
//! separately in CI.
