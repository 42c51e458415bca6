//! User repository for database operations.
//!
//! Backs both the public account endpoints (register, login, profile) and
//! the admin user-management endpoints.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use orchard_core::{Email, UserId};

use super::RepositoryError;
use crate::models::User;

/// Database row for `shop.user`, mapped into the domain [`User`].
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    password_hash: String,
    is_admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, RepositoryError> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email,
            password_hash: row.password_hash,
            is_admin: row.is_admin,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_USER: &str = r"
    SELECT id, name, email, password_hash, is_admin, created_at, updated_at
    FROM shop.user
";

/// Partial profile update; omitted fields retain their prior value.
///
/// `password_hash` is the already-hashed replacement - plaintext never
/// reaches this layer.
#[derive(Debug, Default)]
pub struct UpdateProfile {
    /// New display name, if changing.
    pub name: Option<String>,
    /// New email, if changing.
    pub email: Option<Email>,
    /// New password hash, if the caller supplied a new password.
    pub password_hash: Option<String>,
}

/// Admin role/profile edit. `is_admin` is always written (the admin form
/// always submits it); name and email fall back to prior values.
#[derive(Debug)]
pub struct UpdateUser {
    /// New display name, if changing.
    pub name: Option<String>,
    /// New email, if changing.
    pub email: Option<Email>,
    /// Role flag to set.
    pub is_admin: bool,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE email = $1"))
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    /// Create a new user with a pre-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(
            r"
            INSERT INTO shop.user (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, is_admin, created_at, updated_at
            ",
        )
        .bind(name)
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "email already exists"))?;

        User::try_from(row)
    }

    /// Apply a partial profile update in a single conditional UPDATE keyed by
    /// id. Omitted fields keep their stored value; there is no
    /// read-modify-write window.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new email is taken.
    pub async fn update_profile(
        &self,
        id: UserId,
        update: UpdateProfile,
    ) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            UPDATE shop.user
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, email, password_hash, is_admin, created_at, updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(update.name)
        .bind(update.email.map(Email::into_inner))
        .bind(update.password_hash)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "email already exists"))?;

        row.map_or(Err(RepositoryError::NotFound), User::try_from)
    }

    /// Admin edit: optional name/email plus an unconditional role flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new email is taken.
    pub async fn update_user(
        &self,
        id: UserId,
        update: UpdateUser,
    ) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            UPDATE shop.user
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                is_admin = $4,
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, email, password_hash, is_admin, created_at, updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(update.name)
        .bind(update.email.map(Email::into_inner))
        .bind(update.is_admin)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "email already exists"))?;

        row.map_or(Err(RepositoryError::NotFound), User::try_from)
    }

    /// List all users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!("{SELECT_USER} ORDER BY id ASC"))
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Delete a user.
    ///
    /// Orders referencing this user are left in place; the owner reference
    /// degrades rather than cascading.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn remove(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.user WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
