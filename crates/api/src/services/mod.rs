//! Business services sitting between the routes and the repositories.

pub mod auth;
pub mod pricing;
pub mod token;

pub use auth::{AccountService, AuthError};
pub use pricing::{PriceMismatch, verify_order_totals};
pub use token::{TokenError, TokenService};
