//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that maps the domain error taxonomy to
//! HTTP status codes and the failure envelope. All route handlers return
//! `Result<T, AppError>`.
//!
//! Domain outcomes (not found, duplicate, empty cart, auth failures) are
//! expected and are never logged as errors; transient and internal failures
//! are logged with context, captured to Sentry, and answered with a generic
//! 500 envelope that leaks nothing.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use orchard_core::Envelope;

use crate::db::RepositoryError;
use crate::services::{AuthError, PriceMismatch};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Account operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found. Carries the client-facing message.
    #[error("Not found: {0}")]
    NotFound(String),

    /// This user already reviewed this product.
    #[error("Product already reviewed")]
    AlreadyReviewed,

    /// Order creation with an empty item list.
    #[error("No order items")]
    EmptyCart,

    /// Client-claimed order totals do not add up.
    #[error("Price mismatch: {0}")]
    PriceMismatch(#[from] PriceMismatch),

    /// Missing, malformed or expired bearer token.
    #[error("Unauthorized: {0}")]
    Unauthenticated(String),

    /// Authenticated but not permitted (wrong owner, or admin required).
    #[error("Forbidden")]
    Forbidden,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status_code(&self) -> StatusCode {
        match self {
            Self::Repository(e) => match e {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::BAD_REQUEST,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Auth(e) => match e {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::UserAlreadyExists
                | AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(e) => match e {
                    RepositoryError::NotFound => StatusCode::NOT_FOUND,
                    RepositoryError::Conflict(_) => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                },
                AuthError::PasswordHash | AuthError::Token(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyReviewed
            | Self::EmptyCart
            | Self::PriceMismatch(_)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            // The admin gate answers 401 rather than 403, matching the
            // storefront client's session-expiry handling.
            Self::Unauthenticated(_) | Self::Forbidden => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this is an unanticipated failure (transient store trouble or
    /// a bug) as opposed to an expected domain outcome.
    fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }

    fn is_transient(&self) -> bool {
        match self {
            Self::Repository(e) | Self::Auth(AuthError::Repository(e)) => e.is_transient(),
            _ => false,
        }
    }

    /// The client-facing message. Internal details never pass through here.
    fn client_message(&self) -> String {
        match self {
            Self::Repository(e) => match e {
                RepositoryError::NotFound => "Not Found".to_owned(),
                RepositoryError::Conflict(msg) => msg.clone(),
                _ => "Internal server error".to_owned(),
            },
            Self::Auth(e) => match e {
                AuthError::InvalidCredentials => "Invalid email or password".to_owned(),
                AuthError::UserNotFound => "User not found".to_owned(),
                AuthError::UserAlreadyExists => "User already exists".to_owned(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_owned(),
                AuthError::Repository(RepositoryError::NotFound) => "User not found".to_owned(),
                AuthError::Repository(RepositoryError::Conflict(msg)) => msg.clone(),
                _ => "Internal server error".to_owned(),
            },
            Self::NotFound(msg) => msg.clone(),
            Self::AlreadyReviewed => "Product already reviewed".to_owned(),
            Self::EmptyCart => "No order items".to_owned(),
            Self::PriceMismatch(e) => e.to_string(),
            Self::Unauthenticated(msg) => msg.clone(),
            Self::Forbidden => {
                "You are unauthorized to perform this operation. Please contact your admin"
                    .to_owned()
            }
            Self::BadRequest(msg) => msg.clone(),
            Self::Internal(_) => "Internal server error".to_owned(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture unanticipated failures to Sentry; expected domain
        // outcomes stay out of the error log entirely.
        if self.is_internal() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status_code();
        let envelope = if self.is_internal() {
            let summary = if self.is_transient() {
                "store temporarily unavailable"
            } else {
                "unexpected internal error"
            };
            Envelope::internal_failure(self.client_message(), summary)
        } else {
            Envelope::failure(self.client_message())
        };

        (status, Json(envelope)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_domain_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("Order Not Found".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(get_status(AppError::EmptyCart), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_status(AppError::AlreadyReviewed),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Unauthenticated("Unauthorized - No Token".to_owned())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(get_status(AppError::Forbidden), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserNotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_internal_errors_are_500() {
        assert_eq!(
            get_status(AppError::Internal("boom".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Repository(RepositoryError::Database(
                sqlx::Error::PoolTimedOut
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_ambiguous_credentials_message() {
        // Unknown email and wrong password produce the identical message.
        let err = AppError::Auth(AuthError::InvalidCredentials);
        assert_eq!(err.client_message(), "Invalid email or password");
    }

    #[test]
    fn test_internal_message_does_not_leak() {
        let err = AppError::Internal("connection string postgres://user:pw@host".to_owned());
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_transient_classification() {
        let transient = AppError::Repository(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        assert!(transient.is_transient());
        let internal = AppError::Internal("bug".to_owned());
        assert!(!internal.is_transient());
    }
}
