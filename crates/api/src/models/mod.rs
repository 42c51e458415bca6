//! Domain types served by the API.
//!
//! These are validated domain objects, separate from database row types (the
//! repositories in [`crate::db`] map rows into them). Serialization uses the
//! camelCase field names the storefront client expects.

pub mod order;
pub mod product;
pub mod user;

pub use order::{Order, OrderItem, PaymentResult, ShippingAddress};
pub use product::{Product, Review};
pub use user::{User, UserProfile};
