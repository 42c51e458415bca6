//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring bearer token authentication in route
//! handlers. The token is verified against the signing secret, then the
//! account it names is loaded so revoked accounts are rejected even while
//! their tokens are still within the validity window.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::authz::Identity;
use crate::db::users::UserRepository;
use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(identity): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("user {}", identity.user_id)
/// }
/// ```
pub struct RequireAuth(pub Identity);

/// Extractor that requires a valid bearer token belonging to an admin.
pub struct RequireAdmin(pub Identity);

/// Pull the bearer token out of the `Authorization` header.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthenticated("Unauthorized - No Token".to_owned()))?;

    let value = header
        .to_str()
        .map_err(|_| AppError::Unauthenticated("Unauthorized - Invalid Token".to_owned()))?;

    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthenticated("Unauthorized - No Token".to_owned()))
}

/// Verify the token and load the account it names.
async fn authenticate(parts: &Parts, state: &AppState) -> Result<Identity, AppError> {
    let token = bearer_token(parts)?;

    let user_id = state
        .tokens()
        .verify(token)
        .map_err(|_| AppError::Unauthenticated("Unauthorized - Invalid Token".to_owned()))?;

    // A token naming a deleted account is as good as no token.
    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("Unauthorized - Invalid Token".to_owned()))?;

    Ok(Identity {
        user_id: user.id,
        is_admin: user.is_admin,
    })
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = authenticate(parts, state).await?;
        Ok(Self(identity))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = authenticate(parts, state).await?;
        if !identity.is_admin {
            return Err(AppError::Forbidden);
        }
        Ok(Self(identity))
    }
}
