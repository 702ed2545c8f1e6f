//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and retrieved
//! from the database, together with the pure state queries on the account
//! record (confirmation state, token validity). Request DTOs used by the API
//! layer also live here.

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::sync::LazyLock;
use validator::Validate;

/// Seconds a confirmation token stays valid after being sent.
pub const CONFIRMATION_TOKEN_EXPIRATION_IN_SECONDS: i64 = 600;

/// Seconds after which a password reset token counts as expired.
pub const PASSWORD_RESET_TOKEN_EXPIRATION_IN_SECONDS: i64 = 600;

/// Accepted email shape: word/`+`/`-`/`.` local part, lowercase
/// letters/digits/`-`/`.` domain, alphabetic TLD. Matched case-insensitively;
/// emails are normalized to lowercase before storage.
static VALID_EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[\w+\-.]+@[a-z\d\-.]+\.[a-z]+$").expect("email regex must compile")
});

/// Lowercases and trims an email candidate. Applied before every validation
/// and write so stored addresses compare case-insensitively by equality.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Returns true when the candidate matches the accepted email shape.
pub fn email_format_valid(email: &str) -> bool {
    VALID_EMAIL_REGEX.is_match(email)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    /// Pending address for an in-flight email change, lowercase when present.
    pub unconfirmed_email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub confirmation_token: String,
    pub confirmation_sent_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub password_reset_token: String,
    pub password_reset_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// An account is confirmed once `confirmed_at` is stamped.
    pub fn confirmed(&self) -> bool {
        self.confirmed_at.is_some()
    }

    pub fn unconfirmed(&self) -> bool {
        self.confirmed_at.is_none()
    }

    /// An email change is in flight while `unconfirmed_email` is set.
    pub fn reconfirming(&self) -> bool {
        self.unconfirmed_email.is_some()
    }

    pub fn unconfirmed_or_reconfirming(&self) -> bool {
        self.unconfirmed() || self.reconfirming()
    }

    /// The address the next confirmation message targets: the pending
    /// address when a change is in flight, the current one otherwise.
    pub fn confirmable_email(&self) -> &str {
        self.unconfirmed_email.as_deref().unwrap_or(&self.email)
    }

    /// A confirmation token is valid for ten minutes after being sent;
    /// exactly at the boundary still counts as valid. Never sent counts as
    /// invalid.
    pub fn confirmation_token_valid(&self) -> bool {
        self.confirmation_token_valid_at(Utc::now())
    }

    pub fn confirmation_token_valid_at(&self, now: DateTime<Utc>) -> bool {
        let Some(sent_at) = self.confirmation_sent_at else {
            return false;
        };
        now - sent_at <= Duration::seconds(CONFIRMATION_TOKEN_EXPIRATION_IN_SECONDS)
    }

    /// A reset token expires ten minutes after being sent; exactly at the
    /// boundary already counts as expired (note the tie-break asymmetry with
    /// the confirmation check). Never sent counts as expired.
    pub fn password_reset_token_expired(&self) -> bool {
        self.password_reset_token_expired_at(Utc::now())
    }

    pub fn password_reset_token_expired_at(&self, now: DateTime<Utc>) -> bool {
        let Some(sent_at) = self.password_reset_sent_at else {
            return true;
        };
        now - sent_at >= Duration::seconds(PASSWORD_RESET_TOKEN_EXPIRATION_IN_SECONDS)
    }
}

/// Signup request payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateNewUser {
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub email: String,

    #[validate(length(min = 1, message = "is required"))]
    pub password: String,

    pub password_confirmation: String,
}

/// Repository-level DTO for inserting a user row.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub confirmation_token: String,
    pub password_reset_token: String,
}

/// Request payload for changing the account email.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangeEmailRequest {
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub email: String,
}

/// Request payload for resending a confirmation email.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResendConfirmationRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub email: String,
}

/// Request payload for starting a password reset.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub email: String,
}

/// Request payload for completing a password reset.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub token: String,

    #[validate(length(min = 1, message = "is required"))]
    pub password: String,

    pub password_confirmation: String,
}
