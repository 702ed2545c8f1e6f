//! User business logic service.
//!
//! Handles the account lifecycle: signup validation, email confirmation,
//! email change, and the password reset flow. Token generation, password
//! hashing, and mail delivery are injected capabilities so tests can swap
//! them for deterministic fakes.

use crate::config::Config;
use crate::database::models::{
    ChangeEmailRequest, CreateNewUser, CreateUser, ResetPasswordRequest, User, email_format_valid,
    normalize_email,
};
use crate::errors::{FieldViolation, ServiceError, ServiceResult, collect_violations};
use crate::repositories::user_repository::UserRepository;
use crate::services::email_service::{EmailService, Mailer};
use crate::utils::password::{BcryptPasswordHasher, PasswordHasher};
use crate::utils::token::{SecureTokenGenerator, TokenGenerator};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

pub struct UserService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
    /// Mail delivery capability, absent when SMTP is not configured
    mailer: Option<Arc<dyn Mailer>>,
    /// Opaque secure-token generator
    tokens: Arc<dyn TokenGenerator>,
    /// Password hashing capability
    hasher: Arc<dyn PasswordHasher>,
}

impl<'a> UserService<'a> {
    /// Creates a new UserService instance with the default token generator
    /// and password hasher; the SMTP mailer is built from config when
    /// available.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    /// * `config` - Application configuration
    pub fn new(pool: &'a SqlitePool, config: &Config) -> Self {
        let mailer: Option<Arc<dyn Mailer>> = match config.email_config() {
            Some(email_config) => match EmailService::new(email_config) {
                Ok(service) => Some(Arc::new(service)),
                Err(e) => {
                    tracing::warn!(
                        "Failed to initialize email service: {}. Account email will fail.",
                        e
                    );
                    None
                }
            },
            None => {
                tracing::warn!("Email configuration not found. Account email will fail.");
                None
            }
        };

        Self::with_capabilities(
            pool,
            mailer,
            Arc::new(SecureTokenGenerator),
            Arc::new(BcryptPasswordHasher),
        )
    }

    /// Creates a UserService with every capability supplied by the caller.
    pub fn with_capabilities(
        pool: &'a SqlitePool,
        mailer: Option<Arc<dyn Mailer>>,
        tokens: Arc<dyn TokenGenerator>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            pool,
            mailer,
            tokens,
            hasher,
        }
    }

    fn mailer(&self) -> ServiceResult<&Arc<dyn Mailer>> {
        self.mailer
            .as_ref()
            .ok_or_else(|| ServiceError::delivery("Email transport is not configured"))
    }

    /// Creates a new user with full validation.
    ///
    /// The email is normalized to lowercase before any check or write. Every
    /// field violation is collected before returning, never just the first.
    /// Both account tokens are generated at creation; their `*_sent_at`
    /// timestamps stay unset until the first send.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` listing per-field violations, or
    /// `ServiceError::AlreadyExists` when a concurrent signup won the
    /// storage-level uniqueness race.
    pub async fn create_user(&self, create_user: CreateNewUser) -> ServiceResult<User> {
        let mut violations = collect_violations(&create_user);

        let email = normalize_email(&create_user.email);
        if !email.is_empty() && !email_format_valid(&email) {
            violations.push(FieldViolation::new("email", "is invalid"));
        }

        if create_user.password != create_user.password_confirmation {
            violations.push(FieldViolation::new(
                "password_confirmation",
                "doesn't match password",
            ));
        }

        let repo = UserRepository::new(self.pool);

        // Read-then-decide uniqueness check; the UNIQUE constraint below
        // backstops concurrent signups targeting the same address.
        if !email.is_empty() && repo.email_exists(&email).await? {
            violations.push(FieldViolation::new("email", "has already been taken"));
        }

        if !violations.is_empty() {
            return Err(ServiceError::validation_failed(violations));
        }

        let password_hash = self.hasher.hash(&create_user.password)?;

        let data = CreateUser {
            id: Uuid::now_v7().to_string(),
            email: email.clone(),
            password_hash,
            confirmation_token: self.tokens.generate(),
            password_reset_token: self.tokens.generate(),
        };

        let user = repo.create_user(data).await.map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed:") {
                ServiceError::already_exists("User", &email)
            } else {
                ServiceError::Database { source: e }
            }
        })?;

        tracing::info!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Retrieves a user by ID with existence verification.
    ///
    /// # Errors
    /// Returns `ServiceError::NotFound` if the user doesn't exist
    pub async fn get_user_required(&self, id: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;
        Ok(user)
    }

    /// Confirms the account: when an email change is in flight the pending
    /// address is promoted to the primary email first, then `confirmed_at`
    /// is stamped via a direct-column patch.
    ///
    /// A promotion that lost the race for the address surfaces as
    /// `AlreadyExists`; `confirmed_at` is not stamped in that case.
    pub async fn confirm_user(&self, user: &User) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);

        if let Some(pending) = &user.unconfirmed_email {
            repo.promote_unconfirmed_email(&user.id, pending)
                .await
                .map_err(|e| {
                    if e.to_string().contains("UNIQUE constraint failed:") {
                        ServiceError::already_exists("User", pending)
                    } else {
                        ServiceError::Database { source: e }
                    }
                })?
                .ok_or_else(|| ServiceError::not_found("User", &user.id))?;
        }

        let user = repo
            .set_confirmed_at(&user.id, Utc::now())
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &user.id))?;

        tracing::info!(user_id = %user.id, email = %user.email, "user confirmed");
        Ok(user)
    }

    /// Looks up the account by confirmation token and confirms it if the
    /// token is still within its ten-minute window.
    pub async fn confirm_by_token(&self, token: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);

        let user = repo
            .get_user_by_confirmation_token(token)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", "confirmation token"))?;

        if !user.confirmation_token_valid() {
            return Err(ServiceError::invalid_operation(
                "Confirmation link has expired, request a new one",
            ));
        }

        self.confirm_user(&user).await
    }

    /// Regenerates the confirmation token, stamps `confirmation_sent_at`,
    /// and synchronously delivers the confirmation message to the account's
    /// confirmable email.
    ///
    /// Delivery failure propagates to the caller; the freshly stamped token
    /// is not rolled back.
    pub async fn send_confirmation_email(&self, user: &User) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);

        let token = self.tokens.generate();
        let user = repo
            .stamp_confirmation_token(&user.id, &token, Utc::now())
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &user.id))?;

        self.mailer()?.deliver_confirmation(&user).await?;

        tracing::info!(user_id = %user.id, to = %user.confirmable_email(), "confirmation email sent");
        Ok(user)
    }

    /// Resends the confirmation email for an address; rejected when the
    /// account is already confirmed and no email change is in flight.
    pub async fn resend_confirmation(&self, email: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);

        let user = repo
            .get_user_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| ServiceError::not_found("User", email))?;

        if !user.unconfirmed_or_reconfirming() {
            return Err(ServiceError::invalid_operation("Email is already confirmed"));
        }

        self.send_confirmation_email(&user).await
    }

    /// Starts an email change: validates the new address and records it as
    /// `unconfirmed_email`, then sends a confirmation email to it.
    ///
    /// Availability is checked case-insensitively against existing primary
    /// emails only (the account's own included); other accounts' pending
    /// addresses are not consulted.
    pub async fn request_email_change(
        &self,
        user_id: &str,
        request: ChangeEmailRequest,
    ) -> ServiceResult<User> {
        let user = self.get_user_required(user_id).await?;
        let repo = UserRepository::new(self.pool);

        let mut violations = collect_violations(&request);

        let email = normalize_email(&request.email);
        if !email.is_empty() && !email_format_valid(&email) {
            violations.push(FieldViolation::new("unconfirmed_email", "is invalid"));
        }

        if !email.is_empty() && repo.email_exists(&email).await? {
            violations.push(FieldViolation::new("unconfirmed_email", "is already in use."));
        }

        if !violations.is_empty() {
            return Err(ServiceError::validation_failed(violations));
        }

        let user = repo
            .set_unconfirmed_email(&user.id, &email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id))?;

        self.send_confirmation_email(&user).await
    }

    /// Regenerates the password reset token, stamps
    /// `password_reset_sent_at`, and synchronously delivers the reset
    /// message to the account's primary email.
    pub async fn send_password_reset_email(&self, user: &User) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);

        let token = self.tokens.generate();
        let user = repo
            .stamp_password_reset_token(&user.id, &token, Utc::now())
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &user.id))?;

        self.mailer()?.deliver_password_reset(&user).await?;

        tracing::info!(user_id = %user.id, to = %user.email, "password reset email sent");
        Ok(user)
    }

    /// Starts a password reset for an address; only confirmed accounts
    /// receive a reset email.
    pub async fn forgot_password(&self, email: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);

        let user = repo
            .get_user_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| ServiceError::not_found("User", email))?;

        if user.unconfirmed() {
            return Err(ServiceError::invalid_operation(
                "Email has not been confirmed, confirm it first",
            ));
        }

        self.send_password_reset_email(&user).await
    }

    /// Completes a password reset: looks up the account by reset token,
    /// rejects expired tokens, validates the new password, and re-hashes.
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> ServiceResult<User> {
        let mut violations = collect_violations(&request);

        if request.password != request.password_confirmation {
            violations.push(FieldViolation::new(
                "password_confirmation",
                "doesn't match password",
            ));
        }

        if !violations.is_empty() {
            return Err(ServiceError::validation_failed(violations));
        }

        let repo = UserRepository::new(self.pool);

        let user = repo
            .get_user_by_password_reset_token(&request.token)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", "password reset token"))?;

        if user.password_reset_token_expired() {
            return Err(ServiceError::invalid_operation(
                "Password reset link has expired, request a new one",
            ));
        }

        let password_hash = self.hasher.hash(&request.password)?;

        let user = repo
            .update_password_hash(&user.id, &password_hash)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &user.id))?;

        tracing::info!(user_id = %user.id, "password reset completed");
        Ok(user)
    }
}
