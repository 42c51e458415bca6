//! Core types for Orchard.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod envelope;
pub mod id;

pub use email::{Email, EmailError};
pub use envelope::{Envelope, PageContext, ResponseStatus};
pub use id::*;
