//! Database repository for user account operations.
//!
//! Provides persistence for the User entity in two distinct modes:
//! validated-save style writes that maintain `updated_at`, and direct-column
//! patch writes used by the confirmation and token-stamping flows, which
//! touch only the named columns.

use crate::database::models::{CreateUser, User};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Repository for user database operations.
pub struct UserRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new user in the database.
    ///
    /// Caller is responsible for normalization and validation; the UNIQUE
    /// constraint on `email` is the last line of defense against concurrent
    /// signups racing the same address.
    pub async fn create_user(&self, user: CreateUser) -> Result<User> {
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                id, email, password_hash,
                confirmation_token, password_reset_token,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.confirmation_token)
        .bind(user.password_reset_token)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(user)
    }

    /// Retrieves a user by their unique identifier.
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Retrieves a user by email. Stored emails are lowercase, so the caller
    /// normalizes the lookup value for a case-insensitive match.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Retrieves a user by their current confirmation token.
    pub async fn get_user_by_confirmation_token(&self, token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE confirmation_token = ?")
            .bind(token)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Retrieves a user by their current password reset token.
    pub async fn get_user_by_password_reset_token(&self, token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE password_reset_token = ?")
            .bind(token)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Checks if an email is already taken by any account.
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Sets the pending address for an email change. Validated-save path:
    /// maintains `updated_at`.
    pub async fn set_unconfirmed_email(
        &self,
        id: &str,
        unconfirmed_email: &str,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET unconfirmed_email = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(unconfirmed_email)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Promotes the pending address to the primary email and clears it.
    /// The UNIQUE constraint on `email` rejects a promotion that lost a race
    /// to the same address.
    pub async fn promote_unconfirmed_email(&self, id: &str, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = ?, unconfirmed_email = NULL, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Replaces the stored password hash. Validated-save path.
    pub async fn update_password_hash(&self, id: &str, password_hash: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password_hash = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Stamps `confirmed_at`. Direct-column patch: no validation re-run, no
    /// `updated_at` maintenance.
    pub async fn set_confirmed_at(&self, id: &str, confirmed_at: DateTime<Utc>) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET confirmed_at = ? WHERE id = ? RETURNING *",
        )
        .bind(confirmed_at)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Writes a freshly generated confirmation token together with its sent
    /// timestamp. Direct-column patch.
    pub async fn stamp_confirmation_token(
        &self,
        id: &str,
        token: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET confirmation_token = ?, confirmation_sent_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(token)
        .bind(sent_at)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Writes a freshly generated password reset token together with its
    /// sent timestamp. Direct-column patch.
    pub async fn stamp_password_reset_token(
        &self,
        id: &str,
        token: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password_reset_token = ?, password_reset_sent_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(token)
        .bind(sent_at)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }
}
