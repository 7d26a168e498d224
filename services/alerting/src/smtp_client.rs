//! SMTP Client
//!
//! Handles email sending via SMTP using lettre.

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::{
    transport::smtp::authentication::Credentials, AsyncSmtpTransport, AsyncTransport, Message,
    Tokio1Executor,
};
use shelfwatch_utils::EmailConfig;

use crate::OutgoingEmail;

/// Delivers a composed email. One attempt per call.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Returns the server's response text.
    async fn send(&self, email: &OutgoingEmail) -> Result<String>;
}

/// SMTP client configuration
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl From<&EmailConfig> for SmtpConfig {
    fn from(config: &EmailConfig) -> Self {
        Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            username: config.smtp_username.clone(),
            password: config.smtp_password.clone(),
        }
    }
}

/// SMTP client for sending emails over a STARTTLS relay
pub struct SmtpClient {
    config: SmtpConfig,
}

impl SmtpClient {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    fn build_message(email: &OutgoingEmail) -> Result<Message> {
        let from_mailbox: Mailbox = email.from.parse().context("Invalid from address")?;
        let to_mailbox: Mailbox = email.to.parse().context("Invalid recipient address")?;

        Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(email.subject.as_str())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.body_text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.body_html.clone()),
                    ),
            )
            .context("Failed to build email")
    }
}

#[async_trait]
impl MailTransport for SmtpClient {
    async fn send(&self, email: &OutgoingEmail) -> Result<String> {
        let message = Self::build_message(email)?;

        let creds = Credentials::new(self.config.username.clone(), self.config.password.clone());

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)
                .context("Failed to create SMTP transport")?
                .port(self.config.port)
                .credentials(creds)
                .build();

        let response = mailer.send(message).await.context("Failed to send email")?;

        Ok(response.message().collect::<Vec<_>>().join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &str) -> OutgoingEmail {
        OutgoingEmail {
            from: "Shelfwatch <alerts@lab.example>".to_string(),
            to: to.to_string(),
            subject: "Expiry Alert - 1 Item(s) Require Attention".to_string(),
            body_html: "<p>Ethanol</p>".to_string(),
            body_text: "Ethanol".to_string(),
        }
    }

    #[test]
    fn test_build_message() {
        let message = SmtpClient::build_message(&email("manager@lab.example")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: manager@lab.example"));
        assert!(raw.contains("multipart/alternative"));
    }

    #[test]
    fn test_invalid_recipient() {
        assert!(SmtpClient::build_message(&email("not an address")).is_err());
    }

    #[test]
    fn test_config_from_email_settings() {
        let config = SmtpConfig::from(&EmailConfig {
            smtp_host: "smtp.lab.example".into(),
            smtp_port: 2525,
            ..shelfwatch_utils::AppConfig::default().email
        });
        assert_eq!(SmtpClient::new(config).host(), "smtp.lab.example");
    }
}
