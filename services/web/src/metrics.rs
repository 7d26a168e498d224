//! Prometheus metrics for the web service, kept in a registry owned by the app state.

use prometheus::{IntCounterVec, Opts, Registry, TextEncoder};
use shelfwatch_models::{ScanReport, UrgencyTier};

pub struct AppMetrics {
    registry: Registry,
    scans_total: IntCounterVec,
    report_entries_total: IntCounterVec,
    emails_total: IntCounterVec,
}

impl AppMetrics {
    pub fn new(namespace: &str) -> prometheus::Result<Self> {
        let registry = Registry::new();

        let scans_total = IntCounterVec::new(
            Opts::new("scans_total", "Spreadsheet scans by outcome").namespace(namespace),
            &["outcome"],
        )?;
        let report_entries_total = IntCounterVec::new(
            Opts::new("report_entries_total", "Reported items by urgency tier").namespace(namespace),
            &["tier"],
        )?;
        let emails_total = IntCounterVec::new(
            Opts::new("alert_emails_total", "Alert emails by outcome").namespace(namespace),
            &["outcome"],
        )?;

        registry.register(Box::new(scans_total.clone()))?;
        registry.register(Box::new(report_entries_total.clone()))?;
        registry.register(Box::new(emails_total.clone()))?;

        Ok(Self {
            registry,
            scans_total,
            report_entries_total,
            emails_total,
        })
    }

    pub fn record_scan(&self, report: &ScanReport) {
        self.scans_total.with_label_values(&["success"]).inc();
        for tier in UrgencyTier::ALL {
            let count = report.counts().get(tier) as u64;
            if count > 0 {
                self.report_entries_total
                    .with_label_values(&[tier.as_str()])
                    .inc_by(count);
            }
        }
    }

    pub fn record_scan_failure(&self) {
        self.scans_total.with_label_values(&["failure"]).inc();
    }

    pub fn record_email(&self, sent: bool) {
        let outcome = if sent { "sent" } else { "failed" };
        self.emails_total.with_label_values(&[outcome]).inc();
    }

    pub fn render(&self) -> String {
        TextEncoder::new()
            .encode_to_string(&self.registry.gather())
            .unwrap_or_else(|_| "Error encoding metrics".to_string())
    }
}
