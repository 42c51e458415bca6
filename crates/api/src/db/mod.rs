//! Database operations for the Orchard `PostgreSQL` store.
//!
//! # Schema: `shop`
//!
//! - `user` - Accounts and role flags
//! - `product` - Catalog, with derived `rating`/`num_reviews` columns
//! - `review` - Product reviews, UNIQUE (product_id, user_id)
//! - `order` - Order ledger with payment/delivery completion fields
//! - `order_item` - Item snapshots owned by their order
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/`; apply them with
//! `sqlx migrate run` before starting the server.
//!
//! All queries use the runtime `query`/`query_as` API so the workspace builds
//! without a live database.

pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, duplicate review).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Whether this error is a transient store failure (unreachable, pool
    /// exhausted, timed out) that the caller may retry, as opposed to a bug.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Database(
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            )
        )
    }

    /// Map a sqlx error to `Conflict` when it is a unique violation,
    /// otherwise pass it through as `Database`.
    fn from_unique_violation(e: sqlx::Error, conflict_msg: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict_msg.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// The 10 second acquire timeout is the ceiling on how long any operation
/// waits for the store; on expiry the caller sees a transient failure rather
/// than a hang.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_transient() {
        assert!(RepositoryError::Database(sqlx::Error::PoolTimedOut).is_transient());
        assert!(RepositoryError::Database(sqlx::Error::PoolClosed).is_transient());
    }

    #[test]
    fn test_not_found_is_not_transient() {
        assert!(!RepositoryError::NotFound.is_transient());
        assert!(!RepositoryError::Conflict("email already exists".to_owned()).is_transient());
        assert!(!RepositoryError::DataCorruption("bad email".to_owned()).is_transient());
    }

    #[test]
    fn test_row_not_found_is_not_transient() {
        assert!(!RepositoryError::Database(sqlx::Error::RowNotFound).is_transient());
    }
}
