//! Core business logic for the authentication system.

use crate::auth::models::{LoginRequest, LoginResponse, UserInfo};
use crate::config::Config;
use crate::database::models::normalize_email;
use crate::errors::{ServiceError, ServiceResult, collect_violations};
use crate::repositories::user_repository::UserRepository;
use crate::utils::jwt::{Claims, JwtUtils};
use crate::utils::password::{BcryptPasswordHasher, PasswordHasher};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Authentication service handling login and session introspection
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
    jwt_utils: JwtUtils,
    hasher: Arc<dyn PasswordHasher>,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService instance
    pub fn new(pool: &'a SqlitePool, config: &Config) -> Self {
        Self::with_hasher(pool, config, Arc::new(BcryptPasswordHasher))
    }

    /// Create an AuthService with a caller-supplied password hasher
    pub fn with_hasher(
        pool: &'a SqlitePool,
        config: &Config,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        AuthService {
            pool,
            jwt_utils: JwtUtils::new(config),
            hasher,
        }
    }

    /// Authenticate a user and generate a session token.
    ///
    /// Unknown addresses and wrong passwords produce the same
    /// `PermissionDenied` error so callers can't probe which addresses
    /// exist. Correct credentials on an unconfirmed account never establish
    /// a session; the caller is pointed at the resend-confirmation flow via
    /// `InvalidOperation`.
    pub async fn login(&self, login_request: LoginRequest) -> ServiceResult<LoginResponse> {
        let violations = collect_violations(&login_request);
        if !violations.is_empty() {
            return Err(ServiceError::validation_failed(violations));
        }

        let repo = UserRepository::new(self.pool);

        let Some(user) = repo
            .get_user_by_email(&normalize_email(&login_request.email))
            .await?
        else {
            return Err(ServiceError::permission_denied("Incorrect email or password"));
        };

        if !self
            .hasher
            .verify(&login_request.password, &user.password_hash)?
        {
            return Err(ServiceError::permission_denied("Incorrect email or password"));
        }

        if user.unconfirmed() {
            return Err(ServiceError::invalid_operation(
                "Email has not been confirmed, request a new confirmation link",
            ));
        }

        let access_token = self
            .jwt_utils
            .generate_token(user.id.clone(), user.email.clone())?;

        tracing::info!(user_id = %user.id, "user logged in");

        Ok(LoginResponse {
            access_token,
            user: UserInfo {
                id: user.id,
                email: user.email,
                confirmed: true,
            },
            expires_in: self.jwt_utils.expires_in_seconds(),
        })
    }

    /// Resolve the session claims to the current user
    pub async fn current_user(&self, claims: &Claims) -> ServiceResult<UserInfo> {
        let repo = UserRepository::new(self.pool);

        let user = repo
            .get_user_by_id(claims.user_id())
            .await?
            .ok_or_else(|| ServiceError::not_found("User", claims.user_id()))?;

        Ok(UserInfo {
            confirmed: user.confirmed(),
            id: user.id,
            email: user.email,
        })
    }
}
