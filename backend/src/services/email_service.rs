//! Outbound account email.
//!
//! The `Mailer` trait is the delivery capability the account lifecycle calls
//! into; `EmailService` is the SMTP implementation. Delivery is synchronous
//! from the caller's point of view: the triggering operation fails when the
//! transport does.

use crate::config::EmailConfig;
use crate::database::models::User;
use crate::errors::{ServiceError, ServiceResult};
use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::str::FromStr;

/// Delivery capability for account lifecycle email.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Delivers a confirmation message addressed to the account's
    /// confirmable email (the pending address when an email change is in
    /// flight).
    async fn deliver_confirmation(&self, user: &User) -> ServiceResult<()>;

    /// Delivers a password reset message to the account's primary email.
    async fn deliver_password_reset(&self, user: &User) -> ServiceResult<()>;
}

pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    config: EmailConfig,
}

impl EmailService {
    /// Creates a new EmailService instance
    pub fn new(config: EmailConfig) -> ServiceResult<Self> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| ServiceError::internal_error(format!("Invalid SMTP host: {e}")))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self { mailer, config })
    }

    /// Sends a plain-text + HTML email through the SMTP transport
    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> ServiceResult<()> {
        let from_mailbox = Mailbox::from_str(&format!(
            "{} <{}>",
            self.config.from_name, self.config.from_email
        ))
        .map_err(|e| ServiceError::internal_error(format!("Invalid from email: {e}")))?;

        let to_mailbox = Mailbox::from_str(to_email)
            .map_err(|e| ServiceError::delivery(format!("Invalid recipient email: {e}")))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                lettre::message::MultiPart::alternative()
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_content.to_string()),
                    )
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_content.to_string()),
                    ),
            )
            .map_err(|e| ServiceError::delivery(format!("Failed to build email: {e}")))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| ServiceError::delivery(format!("Failed to send email: {e}")))?;

        Ok(())
    }

    fn build_link_html(&self, heading: &str, body: &str, action: &str, url: &str) -> String {
        format!(
            r#"
            <!DOCTYPE html>
            <html>
            <head>
                <meta charset="UTF-8">
                <title>{}</title>
            </head>
            <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
                <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
                    <h2 style="color: #2c3e50;">{}</h2>

                    <p>{}</p>

                    <div style="text-align: center; margin: 30px 0;">
                        <a href="{}"
                           style="background-color: #3498db; color: white; padding: 12px 30px;
                                  text-decoration: none; border-radius: 5px; display: inline-block;">
                            {}
                        </a>
                    </div>

                    <p>Or copy and paste this link into your browser:</p>
                    <p style="word-break: break-all; color: #7f8c8d;">{}</p>

                    <hr style="border: none; border-top: 1px solid #ecf0f1; margin: 30px 0;">

                    <p style="font-size: 12px; color: #7f8c8d;">
                        This link will expire in 10 minutes. If you didn't request this email,
                        you can safely ignore it.
                    </p>
                </div>
            </body>
            </html>
            "#,
            heading, heading, body, url, action, url
        )
    }

    fn build_link_text(&self, heading: &str, body: &str, url: &str) -> String {
        format!(
            r#"{}

{}

{}

This link will expire in 10 minutes. If you didn't request this email, you can safely ignore it.
            "#,
            heading, body, url
        )
    }
}

#[async_trait]
impl Mailer for EmailService {
    async fn deliver_confirmation(&self, user: &User) -> ServiceResult<()> {
        let url = format!(
            "{}/api/confirmation/{}",
            self.config.base_url, user.confirmation_token
        );

        let heading = "Confirm your email address";
        let body = "Someone signed up for an account with this address, or asked to change an account's email to it. Confirm to continue.";

        self.send_email(
            user.confirmable_email(),
            "Confirmation instructions",
            &self.build_link_html(heading, body, "Confirm email", &url),
            &self.build_link_text(heading, body, &url),
        )
        .await
    }

    async fn deliver_password_reset(&self, user: &User) -> ServiceResult<()> {
        let url = format!(
            "{}/reset-password?token={}",
            self.config.base_url, user.password_reset_token
        );

        let heading = "Reset your password";
        let body = "A password reset was requested for your account. Follow the link to choose a new password.";

        self.send_email(
            &user.email,
            "Password reset instructions",
            &self.build_link_html(heading, body, "Reset password", &url),
            &self.build_link_text(heading, body, &url),
        )
        .await
    }
}
