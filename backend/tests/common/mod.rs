//! Shared fixtures for the integration suites: an in-memory database,
//! deterministic capability fakes, and request builders.

use async_trait::async_trait;
use backend::config::Config;
use backend::database::models::{CreateNewUser, User};
use backend::errors::{ServiceError, ServiceResult};
use backend::services::email_service::Mailer;
use backend::services::user_service::UserService;
use backend::utils::password::BcryptPasswordHasher;
use backend::utils::token::SecureTokenGenerator;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::{Arc, Mutex};

/// A single connection so every query sees the same in-memory database.
pub async fn setup_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations apply");

    pool
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        max_connections: 1,
        acquire_timeout_seconds: 3,
        jwt_secret: "integration-test-secret".to_string(),
        jwt_expires_in_seconds: 3600,
        server_port: 0,
        smtp_host: None,
        smtp_port: 587,
        smtp_username: None,
        smtp_password: None,
        mailer_from_name: "Accounts".to_string(),
        mailer_from_email: "no-reply@example.com".to_string(),
        base_url: "http://localhost:3000".to_string(),
    }
}

/// One recorded outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Confirmation { to: String, token: String },
    PasswordReset { to: String, token: String },
}

/// Mailer fake that records instead of sending.
#[derive(Default)]
pub struct RecordingMailer {
    pub deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingMailer {
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn deliver_confirmation(&self, user: &User) -> ServiceResult<()> {
        self.deliveries.lock().unwrap().push(Delivery::Confirmation {
            to: user.confirmable_email().to_string(),
            token: user.confirmation_token.clone(),
        });
        Ok(())
    }

    async fn deliver_password_reset(&self, user: &User) -> ServiceResult<()> {
        self.deliveries
            .lock()
            .unwrap()
            .push(Delivery::PasswordReset {
                to: user.email.clone(),
                token: user.password_reset_token.clone(),
            });
        Ok(())
    }
}

/// Mailer fake whose transport always fails.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn deliver_confirmation(&self, _user: &User) -> ServiceResult<()> {
        Err(ServiceError::delivery("smtp connection refused"))
    }

    async fn deliver_password_reset(&self, _user: &User) -> ServiceResult<()> {
        Err(ServiceError::delivery("smtp connection refused"))
    }
}

pub fn user_service<'a>(pool: &'a SqlitePool, mailer: Arc<dyn Mailer>) -> UserService<'a> {
    UserService::with_capabilities(
        pool,
        Some(mailer),
        Arc::new(SecureTokenGenerator),
        Arc::new(BcryptPasswordHasher),
    )
}

pub fn signup(email: &str, password: &str) -> CreateNewUser {
    CreateNewUser {
        email: email.to_string(),
        password: password.to_string(),
        password_confirmation: password.to_string(),
    }
}
