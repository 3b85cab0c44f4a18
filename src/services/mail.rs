//! Outbound mail for confirmation codes.
//!
//! The [`Mailer`] trait is object-safe so the application state can hold
//! either a real SMTP transport or the log-only fallback used in local
//! development and tests.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail address: {0}")]
    Address(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("failed to send mail: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_confirmation_code(&self, to: &str, code: &str) -> Result<(), MailError>;
}

/// Delivers confirmation codes over SMTP.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(mail: &MailConfig) -> Result<Self, MailError> {
        let from: Mailbox = mail
            .from_address
            .parse()
            .map_err(|_| MailError::Address(mail.from_address.clone()))?;

        let mut builder = if mail.smtp_username.is_empty() {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&mail.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&mail.smtp_host)
                .map_err(|e| MailError::Transport(e.to_string()))?
                .credentials(Credentials::new(
                    mail.smtp_username.clone(),
                    mail.smtp_password.clone(),
                ))
        };
        builder = builder.port(mail.smtp_port);

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_confirmation_code(&self, to: &str, code: &str) -> Result<(), MailError> {
        let to: Mailbox = to
            .parse()
            .map_err(|_| MailError::Address(to.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Your confirmation code")
            .body(format!("Your confirmation code: {code}"))
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(())
    }
}

/// Writes the code to the log instead of sending it. Used when SMTP is
/// disabled in the config, and by the integration tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_confirmation_code(&self, to: &str, code: &str) -> Result<(), MailError> {
        info!("Confirmation code for {to}: {code}");
        Ok(())
    }
}
