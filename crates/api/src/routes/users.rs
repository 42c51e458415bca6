//! User account routes.
//!
//! Registration and login are the only unauthenticated entry points; they
//! answer with the user's profile plus a fresh bearer token. Profile
//! self-service requires a token, account administration requires an admin
//! token.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use orchard_core::{Email, Envelope, UserId};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{User, UserProfile};
use crate::services::{AccountService, AuthError};
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile self-edit body; omitted fields keep their stored values.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Admin edit of another account. The role flag is always submitted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_admin: bool,
}

/// Profile plus bearer token, answered on register, login and profile edit.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthedUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub is_admin: bool,
    pub token: String,
}

impl AuthedUser {
    fn new(user: &User, token: String) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            token,
        }
    }
}

/// Register a new account.
///
/// POST /api/users
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let accounts = AccountService::new(state.pool());
    let user = accounts
        .register(&body.name, &body.email, &body.password)
        .await?;
    let token = state.tokens().issue(user.id).map_err(AuthError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(
            "User Registered Successfully",
            AuthedUser::new(&user, token),
        )),
    ))
}

/// Exchange credentials for a bearer token.
///
/// POST /api/users/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let accounts = AccountService::new(state.pool());
    let user = accounts.login(&body.email, &body.password).await?;
    let token = state.tokens().issue(user.id).map_err(AuthError::from)?;

    Ok(Json(Envelope::success(
        "Login Successful",
        AuthedUser::new(&user, token),
    )))
}

/// The caller's own profile.
///
/// GET /api/users/profile
pub async fn get_profile(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<impl IntoResponse> {
    let accounts = AccountService::new(state.pool());
    let user = accounts.get_user(identity.user_id).await?;

    Ok(Json(Envelope::success(
        "User Profile Fetched Successfully",
        UserProfile::from(&user),
    )))
}

/// Update the caller's own profile. Answers with a fresh token so the
/// client can swap credentials without re-logging in.
///
/// PUT /api/users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse> {
    let accounts = AccountService::new(state.pool());
    let user = accounts
        .update_profile(identity.user_id, body.name, body.email, body.password)
        .await?;
    let token = state.tokens().issue(user.id).map_err(AuthError::from)?;

    Ok(Json(Envelope::success(
        "User Profile Updated Successfully",
        AuthedUser::new(&user, token),
    )))
}

/// List every account (admin).
///
/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<impl IntoResponse> {
    let accounts = AccountService::new(state.pool());
    let users = accounts.list_users().await?;
    let profiles: Vec<UserProfile> = users.iter().map(UserProfile::from).collect();

    Ok(Json(Envelope::success(
        "Users Fetched Successfully",
        profiles,
    )))
}

/// Fetch one account (admin).
///
/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse> {
    let accounts = AccountService::new(state.pool());
    let user = accounts.get_user(id).await?;

    Ok(Json(Envelope::success(
        "User Fetched Successfully",
        UserProfile::from(&user),
    )))
}

/// Edit another account's name, email or role (admin). Never touches the
/// password.
///
/// PUT /api/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<UserId>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse> {
    let accounts = AccountService::new(state.pool());
    let user = accounts
        .update_user(id, body.name, body.email, body.is_admin)
        .await?;

    Ok(Json(Envelope::success(
        "User Updated Successfully",
        UserProfile::from(&user),
    )))
}

/// Delete an account (admin). Its orders remain in the ledger.
///
/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(identity): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse> {
    // An admin deleting their own account would orphan the session that
    // authorized the deletion.
    if identity.user_id == id {
        return Err(AppError::BadRequest(
            "Admins cannot delete their own account".to_owned(),
        ));
    }

    let accounts = AccountService::new(state.pool());
    accounts.remove_user(id).await?;

    Ok(Json(Envelope::success_empty("User Removed Successfully")))
}
