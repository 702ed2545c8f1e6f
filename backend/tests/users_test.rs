//! Integration tests for the account record lifecycle: signup validation,
//! email confirmation, email change, and the password reset flow.

mod common;

use backend::database::models::{ChangeEmailRequest, CreateNewUser, ResetPasswordRequest};
use backend::errors::ServiceError;
use backend::repositories::user_repository::UserRepository;
use backend::utils::password::{BcryptPasswordHasher, PasswordHasher};
use chrono::{Duration, Utc};
use common::{Delivery, FailingMailer, RecordingMailer, setup_pool, signup, user_service};
use std::sync::Arc;

#[tokio::test]
async fn test_email_is_stored_lowercase() {
    let pool = setup_pool().await;
    let mailer = Arc::new(RecordingMailer::default());
    let service = user_service(&pool, mailer);

    let user = service
        .create_user(signup("  New.User+Tag@Example.COM ", "password"))
        .await
        .unwrap();

    assert_eq!(user.email, "new.user+tag@example.com");
    assert!(user.unconfirmed());
    assert!(user.confirmation_sent_at.is_none());
    assert!(user.password_reset_sent_at.is_none());
}

#[tokio::test]
async fn test_duplicate_email_differing_only_by_case_is_rejected() {
    let pool = setup_pool().await;
    let mailer = Arc::new(RecordingMailer::default());
    let service = user_service(&pool, mailer);

    service
        .create_user(signup("taken@example.com", "password"))
        .await
        .unwrap();

    let err = service
        .create_user(signup("TAKEN@EXAMPLE.COM", "password"))
        .await
        .unwrap_err();

    let violations = err.violations();
    assert!(
        violations
            .iter()
            .any(|v| v.field == "email" && v.message == "has already been taken"),
        "unexpected violations: {violations:?}"
    );
}

#[tokio::test]
async fn test_signup_collects_every_violation() {
    let pool = setup_pool().await;
    let mailer = Arc::new(RecordingMailer::default());
    let service = user_service(&pool, mailer);

    let err = service
        .create_user(CreateNewUser {
            email: "not-an-email".to_string(),
            password: "password".to_string(),
            password_confirmation: "different".to_string(),
        })
        .await
        .unwrap_err();

    let violations = err.violations();
    assert!(violations.iter().any(|v| v.field == "email"));
    assert!(violations.iter().any(|v| v.field == "password_confirmation"));
}

#[tokio::test]
async fn test_confirm_without_pending_email_stamps_confirmed_at() {
    let pool = setup_pool().await;
    let mailer = Arc::new(RecordingMailer::default());
    let service = user_service(&pool, mailer);

    let user = service
        .create_user(signup("user@example.com", "password"))
        .await
        .unwrap();

    let confirmed = service.confirm_user(&user).await.unwrap();

    assert_eq!(confirmed.email, "user@example.com");
    assert!(confirmed.unconfirmed_email.is_none());
    assert!(confirmed.confirmed());
}

#[tokio::test]
async fn test_confirm_promotes_pending_email() {
    let pool = setup_pool().await;
    let mailer = Arc::new(RecordingMailer::default());
    let service = user_service(&pool, mailer.clone());

    let user = service
        .create_user(signup("old@example.com", "password"))
        .await
        .unwrap();
    let user = service.confirm_user(&user).await.unwrap();

    let user = service
        .request_email_change(
            &user.id,
            ChangeEmailRequest {
                email: "new@example.com".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(user.reconfirming());
    assert_eq!(user.confirmable_email(), "new@example.com");

    let confirmed = service.confirm_user(&user).await.unwrap();

    assert_eq!(confirmed.email, "new@example.com");
    assert!(confirmed.unconfirmed_email.is_none());
    assert!(confirmed.confirmed());
}

#[tokio::test]
async fn test_confirm_losing_promotion_race_is_rejected_and_unstamped() {
    let pool = setup_pool().await;
    let mailer = Arc::new(RecordingMailer::default());
    let service = user_service(&pool, mailer);

    let owner = service
        .create_user(signup("owner@example.com", "password"))
        .await
        .unwrap();
    service.confirm_user(&owner).await.unwrap();

    let late = service
        .create_user(signup("late@example.com", "password"))
        .await
        .unwrap();

    // the address was claimed after this account requested its change
    let repo = UserRepository::new(&pool);
    let late = repo
        .set_unconfirmed_email(&late.id, "owner@example.com")
        .await
        .unwrap()
        .unwrap();

    let err = service.confirm_user(&late).await.unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyExists { .. }));

    let reloaded = repo.get_user_by_id(&late.id).await.unwrap().unwrap();
    assert!(reloaded.unconfirmed());
    assert_eq!(reloaded.email, "late@example.com");
    assert_eq!(
        reloaded.unconfirmed_email.as_deref(),
        Some("owner@example.com")
    );
}

#[tokio::test]
async fn test_pending_email_taken_by_existing_account_is_rejected() {
    let pool = setup_pool().await;
    let mailer = Arc::new(RecordingMailer::default());
    let service = user_service(&pool, mailer);

    service
        .create_user(signup("a@x.com", "password"))
        .await
        .unwrap();
    let b = service
        .create_user(signup("b@x.com", "password"))
        .await
        .unwrap();

    // differing only by case from an existing primary address
    let err = service
        .request_email_change(
            &b.id,
            ChangeEmailRequest {
                email: "A@X.com".to_string(),
            },
        )
        .await
        .unwrap_err();

    let violations = err.violations();
    assert!(
        violations
            .iter()
            .any(|v| v.field == "unconfirmed_email" && v.message == "is already in use."),
        "unexpected violations: {violations:?}"
    );
}

#[tokio::test]
async fn test_send_confirmation_email_rotates_token_each_time() {
    let pool = setup_pool().await;
    let mailer = Arc::new(RecordingMailer::default());
    let service = user_service(&pool, mailer.clone());

    let user = service
        .create_user(signup("user@example.com", "password"))
        .await
        .unwrap();
    let original_token = user.confirmation_token.clone();

    let user = service.send_confirmation_email(&user).await.unwrap();
    let first_token = user.confirmation_token.clone();
    assert_ne!(first_token, original_token);
    assert!(user.confirmation_sent_at.is_some());

    let user = service.send_confirmation_email(&user).await.unwrap();
    assert_ne!(user.confirmation_token, first_token);

    let deliveries = mailer.deliveries();
    assert_eq!(deliveries.len(), 2);
    assert_eq!(
        deliveries[0],
        Delivery::Confirmation {
            to: "user@example.com".to_string(),
            token: first_token,
        }
    );
}

#[tokio::test]
async fn test_confirmation_email_targets_pending_address() {
    let pool = setup_pool().await;
    let mailer = Arc::new(RecordingMailer::default());
    let service = user_service(&pool, mailer.clone());

    let user = service
        .create_user(signup("old@example.com", "password"))
        .await
        .unwrap();
    let user = service.confirm_user(&user).await.unwrap();

    service
        .request_email_change(
            &user.id,
            ChangeEmailRequest {
                email: "new@example.com".to_string(),
            },
        )
        .await
        .unwrap();

    let deliveries = mailer.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert!(matches!(
        &deliveries[0],
        Delivery::Confirmation { to, .. } if to == "new@example.com"
    ));
}

#[tokio::test]
async fn test_delivery_failure_propagates() {
    let pool = setup_pool().await;
    let recording = Arc::new(RecordingMailer::default());
    let service = user_service(&pool, recording);

    let user = service
        .create_user(signup("user@example.com", "password"))
        .await
        .unwrap();
    let original_token = user.confirmation_token.clone();

    let failing = user_service(&pool, Arc::new(FailingMailer));
    let err = failing.send_confirmation_email(&user).await.unwrap_err();
    assert!(matches!(err, ServiceError::Delivery { .. }));

    // the freshly stamped token is not rolled back
    let repo = UserRepository::new(&pool);
    let stored = repo.get_user_by_id(&user.id).await.unwrap().unwrap();
    assert_ne!(stored.confirmation_token, original_token);
    assert!(stored.confirmation_sent_at.is_some());
}

#[tokio::test]
async fn test_confirm_by_token_rejects_expired_link() {
    let pool = setup_pool().await;
    let mailer = Arc::new(RecordingMailer::default());
    let service = user_service(&pool, mailer);

    let user = service
        .create_user(signup("user@example.com", "password"))
        .await
        .unwrap();

    let repo = UserRepository::new(&pool);
    repo.stamp_confirmation_token(
        &user.id,
        "stale-confirmation-token",
        Utc::now() - Duration::seconds(601),
    )
    .await
    .unwrap();

    let err = service
        .confirm_by_token("stale-confirmation-token")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation { .. }));

    let stored = repo.get_user_by_id(&user.id).await.unwrap().unwrap();
    assert!(stored.unconfirmed());
}

#[tokio::test]
async fn test_confirm_by_token_within_window() {
    let pool = setup_pool().await;
    let mailer = Arc::new(RecordingMailer::default());
    let service = user_service(&pool, mailer);

    let user = service
        .create_user(signup("user@example.com", "password"))
        .await
        .unwrap();
    let user = service.send_confirmation_email(&user).await.unwrap();

    let confirmed = service
        .confirm_by_token(&user.confirmation_token)
        .await
        .unwrap();
    assert!(confirmed.confirmed());
}

#[tokio::test]
async fn test_resend_confirmation_rejected_when_already_confirmed() {
    let pool = setup_pool().await;
    let mailer = Arc::new(RecordingMailer::default());
    let service = user_service(&pool, mailer);

    let user = service
        .create_user(signup("user@example.com", "password"))
        .await
        .unwrap();
    service.confirm_user(&user).await.unwrap();

    let err = service
        .resend_confirmation("user@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation { .. }));
}

#[tokio::test]
async fn test_forgot_password_requires_confirmed_account() {
    let pool = setup_pool().await;
    let mailer = Arc::new(RecordingMailer::default());
    let service = user_service(&pool, mailer.clone());

    let user = service
        .create_user(signup("user@example.com", "password"))
        .await
        .unwrap();

    let err = service.forgot_password("user@example.com").await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation { .. }));
    assert!(mailer.deliveries().is_empty());

    service.confirm_user(&user).await.unwrap();
    let user = service.forgot_password("user@example.com").await.unwrap();

    assert!(user.password_reset_sent_at.is_some());
    assert!(matches!(
        &mailer.deliveries()[..],
        [Delivery::PasswordReset { to, .. }] if to == "user@example.com"
    ));
}

#[tokio::test]
async fn test_reset_password_with_valid_token() {
    let pool = setup_pool().await;
    let mailer = Arc::new(RecordingMailer::default());
    let service = user_service(&pool, mailer);

    let user = service
        .create_user(signup("user@example.com", "password"))
        .await
        .unwrap();
    service.confirm_user(&user).await.unwrap();
    let user = service.forgot_password("user@example.com").await.unwrap();

    let updated = service
        .reset_password(ResetPasswordRequest {
            token: user.password_reset_token.clone(),
            password: "new-password".to_string(),
            password_confirmation: "new-password".to_string(),
        })
        .await
        .unwrap();

    let hasher = BcryptPasswordHasher;
    assert!(hasher.verify("new-password", &updated.password_hash).unwrap());
    assert!(!hasher.verify("password", &updated.password_hash).unwrap());
}

#[tokio::test]
async fn test_reset_password_rejects_never_sent_token() {
    let pool = setup_pool().await;
    let mailer = Arc::new(RecordingMailer::default());
    let service = user_service(&pool, mailer);

    // the token generated at signup was never sent, so it counts as expired
    let user = service
        .create_user(signup("user@example.com", "password"))
        .await
        .unwrap();

    let err = service
        .reset_password(ResetPasswordRequest {
            token: user.password_reset_token.clone(),
            password: "new-password".to_string(),
            password_confirmation: "new-password".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation { .. }));
}

#[tokio::test]
async fn test_reset_password_rejects_expired_token() {
    let pool = setup_pool().await;
    let mailer = Arc::new(RecordingMailer::default());
    let service = user_service(&pool, mailer);

    let user = service
        .create_user(signup("user@example.com", "password"))
        .await
        .unwrap();

    let repo = UserRepository::new(&pool);
    repo.stamp_password_reset_token(
        &user.id,
        "stale-reset-token",
        Utc::now() - Duration::seconds(600),
    )
    .await
    .unwrap();

    let err = service
        .reset_password(ResetPasswordRequest {
            token: "stale-reset-token".to_string(),
            password: "new-password".to_string(),
            password_confirmation: "new-password".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation { .. }));
}

#[tokio::test]
async fn test_reset_password_rejects_mismatched_confirmation() {
    let pool = setup_pool().await;
    let mailer = Arc::new(RecordingMailer::default());
    let service = user_service(&pool, mailer);

    service
        .create_user(signup("user@example.com", "password"))
        .await
        .unwrap();

    let err = service
        .reset_password(ResetPasswordRequest {
            token: "whatever".to_string(),
            password: "new-password".to_string(),
            password_confirmation: "other-password".to_string(),
        })
        .await
        .unwrap_err();

    assert!(
        err.violations()
            .iter()
            .any(|v| v.field == "password_confirmation")
    );
}
