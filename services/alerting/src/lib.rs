//! # Shelfwatch Alerting
//!
//! Turns a scan report into an HTML/plain-text alert email and delivers it
//! over SMTP.

pub mod smtp_client;
pub mod template_engine;

use serde::Serialize;
use shelfwatch_models::ScanReport;
use shelfwatch_utils::{EmailConfig, ShelfwatchError, ShelfwatchResult};
use std::sync::Arc;
use tracing::{info, warn};

pub use smtp_client::{MailTransport, SmtpClient, SmtpConfig};
pub use template_engine::{RenderedEmail, TemplateEngine};

/// Sender and recipient of one alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSettings {
    pub from_address: String,
    pub from_name: String,
    pub recipient: String,
}

impl AlertSettings {
    /// Sender from configuration; the recipient falls back to the configured default.
    pub fn from_config(config: &EmailConfig, recipient: Option<&str>) -> ShelfwatchResult<Self> {
        let recipient = recipient
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .or_else(|| config.default_recipient.clone())
            .ok_or_else(|| ShelfwatchError::validation("recipient", "A recipient email address is required"))?;

        if recipient.parse::<lettre::Address>().is_err() {
            return Err(ShelfwatchError::validation(
                "recipient",
                format!("'{}' is not a valid email address", recipient),
            ));
        }

        Ok(Self {
            from_address: config.from_address.clone(),
            from_name: config.from_name.clone(),
            recipient,
        })
    }

    fn from_mailbox(&self) -> String {
        if self.from_name.is_empty() {
            self.from_address.clone()
        } else {
            format!("{} <{}>", self.from_name, self.from_address)
        }
    }
}

/// A fully rendered message ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body_html: String,
    pub body_text: String,
}

impl OutgoingEmail {
    fn new(settings: &AlertSettings, rendered: RenderedEmail) -> Self {
        Self {
            from: settings.from_mailbox(),
            to: settings.recipient.clone(),
            subject: rendered.subject,
            body_html: rendered.body_html,
            body_text: rendered.body_text,
        }
    }
}

/// Compose the alert for a report without sending it.
pub fn compose_alert(report: &ScanReport, settings: &AlertSettings) -> ShelfwatchResult<OutgoingEmail> {
    let rendered = render_report(&TemplateEngine::new(), report)?;
    Ok(OutgoingEmail::new(settings, rendered))
}

/// Render a report; an empty report has nothing to alert on.
fn render_report(engine: &TemplateEngine, report: &ScanReport) -> ShelfwatchResult<RenderedEmail> {
    if report.is_empty() {
        return Err(ShelfwatchError::validation(
            "report",
            format!(
                "No items expire within {} days; there is nothing to send",
                report.thresholds().warning_days
            ),
        ));
    }

    engine
        .render_alert(report)
        .map_err(|e| ShelfwatchError::internal(format!("{:#}", e)))
}

/// Composes and sends expiry alerts through a transport.
#[derive(Clone)]
pub struct AlertMailer {
    engine: Arc<TemplateEngine>,
    transport: Arc<dyn MailTransport>,
}

impl AlertMailer {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self {
            engine: Arc::new(TemplateEngine::new()),
            transport,
        }
    }

    pub fn from_config(config: &EmailConfig) -> Self {
        Self::new(Arc::new(SmtpClient::new(SmtpConfig::from(config))))
    }

    /// Rendered subject and bodies, without sender or recipient.
    pub fn preview(&self, report: &ScanReport) -> ShelfwatchResult<RenderedEmail> {
        render_report(&self.engine, report)
    }

    pub fn compose(&self, report: &ScanReport, settings: &AlertSettings) -> ShelfwatchResult<OutgoingEmail> {
        let rendered = render_report(&self.engine, report)?;
        Ok(OutgoingEmail::new(settings, rendered))
    }

    /// Compose and send once. A transport failure becomes a `MailSend` error
    /// carrying the transport's message.
    pub async fn send_report(&self, report: &ScanReport, settings: &AlertSettings) -> ShelfwatchResult<OutgoingEmail> {
        let email = self.compose(report, settings)?;

        match self.transport.send(&email).await {
            Ok(response) => {
                info!(
                    "Sent expiry alert for {} ({} items) to {}: {}",
                    report.filename(),
                    report.entries().len(),
                    email.to,
                    response
                );
                Ok(email)
            }
            Err(e) => {
                warn!("Failed to send expiry alert to {}: {:#}", email.to, e);
                Err(ShelfwatchError::mail_send(format!("{:#}", e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use shelfwatch_models::{ExpiryRecord, ReportEntry, ScanStats, TierThresholds};
    use shelfwatch_utils::AppConfig;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<OutgoingEmail>>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, email: &OutgoingEmail) -> anyhow::Result<String> {
            if let Some(message) = &self.fail_with {
                anyhow::bail!("{}", message);
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok("250 OK".to_string())
        }
    }

    fn report(with_entry: bool) -> ScanReport {
        let reference = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let thresholds = TierThresholds::default();
        let entries = if with_entry {
            let record = ExpiryRecord::new("Stock", 2, NaiveDate::from_ymd_opt(2026, 3, 6).unwrap())
                .with_label("Ethanol");
            vec![ReportEntry::evaluate(record, reference, &thresholds)]
        } else {
            Vec::new()
        };
        ScanReport::new("stock.xlsx", reference, thresholds, entries, ScanStats::default(), Vec::new())
    }

    fn settings() -> AlertSettings {
        AlertSettings {
            from_address: "alerts@lab.example".into(),
            from_name: "Lab Alerts".into(),
            recipient: "manager@lab.example".into(),
        }
    }

    #[test]
    fn test_compose_alert() {
        let email = compose_alert(&report(true), &settings()).unwrap();
        assert_eq!(email.from, "Lab Alerts <alerts@lab.example>");
        assert_eq!(email.to, "manager@lab.example");
        assert_eq!(email.subject, "Expiry Alert - 1 Item(s) Require Attention");
        assert!(email.body_html.contains("Ethanol"));
        assert!(email.body_text.contains("5 days left"));
    }

    #[test]
    fn test_empty_report_is_not_composed() {
        let err = compose_alert(&report(false), &settings()).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_recipient_fallback() {
        let mut config = AppConfig::default().email;
        assert!(AlertSettings::from_config(&config, None).is_err());

        config.default_recipient = Some("stores@lab.example".into());
        let settings = AlertSettings::from_config(&config, Some("  ")).unwrap();
        assert_eq!(settings.recipient, "stores@lab.example");

        let settings = AlertSettings::from_config(&config, Some("pi@lab.example")).unwrap();
        assert_eq!(settings.recipient, "pi@lab.example");

        let err = AlertSettings::from_config(&config, Some("pi at lab")).unwrap_err();
        assert_eq!(err.http_status_code(), 400);
    }

    #[tokio::test]
    async fn test_send_report_uses_transport_once() {
        let transport = Arc::new(RecordingTransport::default());
        let mailer = AlertMailer::new(transport.clone());

        mailer.send_report(&report(true), &settings()).await.unwrap();
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_send_failure_is_surfaced_verbatim() {
        let transport = Arc::new(RecordingTransport {
            fail_with: Some("535 5.7.8 Username and Password not accepted".into()),
            ..Default::default()
        });
        let mailer = AlertMailer::new(transport);

        let err = tokio_test::block_on(mailer.send_report(&report(true), &settings())).unwrap_err();
        assert_eq!(err.error_code(), "MAIL_SEND_ERROR");
        assert_eq!(err.user_message(), "535 5.7.8 Username and Password not accepted");
    }
}
