use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::columns::InfoField;

/// Facts extracted from one spreadsheet row that carries an expiry date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryRecord {
    pub sheet: String,
    pub row_number: usize,
    pub label: Option<String>,
    pub expiry_date: NaiveDate,
    pub lot: Option<String>,
    pub location: Option<String>,
    pub catalog: Option<String>,
    pub quantity: Option<String>,
    pub supplier: Option<String>,
}

impl ExpiryRecord {
    pub fn new(sheet: impl Into<String>, row_number: usize, expiry_date: NaiveDate) -> Self {
        Self {
            sheet: sheet.into(),
            row_number,
            label: None,
            expiry_date,
            lot: None,
            location: None,
            catalog: None,
            quantity: None,
            supplier: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or("Unknown Item")
    }

    pub fn info(&self, field: InfoField) -> Option<&str> {
        match field {
            InfoField::Lot => self.lot.as_deref(),
            InfoField::Location => self.location.as_deref(),
            InfoField::Catalog => self.catalog.as_deref(),
            InfoField::Quantity => self.quantity.as_deref(),
            InfoField::Supplier => self.supplier.as_deref(),
        }
    }

    pub fn set_info(&mut self, field: InfoField, value: impl Into<String>) {
        let slot = match field {
            InfoField::Lot => &mut self.lot,
            InfoField::Location => &mut self.location,
            InfoField::Catalog => &mut self.catalog,
            InfoField::Quantity => &mut self.quantity,
            InfoField::Supplier => &mut self.supplier,
        };
        *slot = Some(value.into());
    }

    /// Extra-info fields that are present, in display order.
    pub fn details(&self) -> Vec<(InfoField, &str)> {
        InfoField::ALL
            .iter()
            .filter_map(|f| self.info(*f).map(|v| (*f, v)))
            .collect()
    }

    pub fn days_until(&self, reference: NaiveDate) -> i64 {
        (self.expiry_date - reference).num_days()
    }
}

/// Cut-points used to bucket days-until-expiry into tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub critical_days: u32,
    pub urgent_days: u32,
    pub warning_days: u32,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            critical_days: 7,
            urgent_days: 30,
            warning_days: 90,
        }
    }
}

/// Severity bucket derived from days-until-expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyTier {
    Expired,
    Critical,
    Urgent,
    Warning,
    Ok,
}

impl UrgencyTier {
    /// Most severe first.
    pub const ALL: [UrgencyTier; 5] = [
        Self::Expired,
        Self::Critical,
        Self::Urgent,
        Self::Warning,
        Self::Ok,
    ];

    /// Classify a days-until-expiry value.
    ///
    /// Anything at or below zero days is expired regardless of thresholds.
    /// Anything past the warning period is `Ok`.
    pub fn classify(days_until_expiry: i64, thresholds: &TierThresholds) -> Self {
        if days_until_expiry <= 0 {
            Self::Expired
        } else if days_until_expiry > i64::from(thresholds.warning_days) {
            Self::Ok
        } else if days_until_expiry <= i64::from(thresholds.critical_days) {
            Self::Critical
        } else if days_until_expiry <= i64::from(thresholds.urgent_days) {
            Self::Urgent
        } else {
            Self::Warning
        }
    }

    pub fn severity(self) -> u8 {
        match self {
            Self::Expired => 4,
            Self::Critical => 3,
            Self::Urgent => 2,
            Self::Warning => 1,
            Self::Ok => 0,
        }
    }

    pub fn is_reportable(self) -> bool {
        self != Self::Ok
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::Critical => "critical",
            Self::Urgent => "urgent",
            Self::Warning => "warning",
            Self::Ok => "ok",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Expired => "EXPIRED",
            Self::Critical => "CRITICAL",
            Self::Urgent => "URGENT",
            Self::Warning => "WARNING",
            Self::Ok => "OK",
        }
    }

    /// Foreground and background colours used in rendered reports.
    pub fn colours(self) -> (&'static str, &'static str) {
        match self {
            Self::Expired => ("#7f1d1d", "#fde2e2"),
            Self::Critical => ("#cc0000", "#ffebee"),
            Self::Urgent => ("#cc6600", "#fff3e0"),
            Self::Warning => ("#996600", "#fffde7"),
            Self::Ok => ("#166534", "#ecfdf5"),
        }
    }
}

impl fmt::Display for UrgencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown urgency tier: {0}")]
pub struct ParseTierError(pub String);

impl FromStr for UrgencyTier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| ParseTierError(s.to_string()))
    }
}

/// A record together with its classification relative to a reference date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    #[serde(flatten)]
    pub record: ExpiryRecord,
    pub days_until_expiry: i64,
    pub tier: UrgencyTier,
}

impl ReportEntry {
    pub fn evaluate(record: ExpiryRecord, reference: NaiveDate, thresholds: &TierThresholds) -> Self {
        let days_until_expiry = record.days_until(reference);
        Self {
            tier: UrgencyTier::classify(days_until_expiry, thresholds),
            days_until_expiry,
            record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_classify_cut_points() {
        let t = TierThresholds::default();
        assert_eq!(UrgencyTier::classify(-3, &t), UrgencyTier::Expired);
        assert_eq!(UrgencyTier::classify(0, &t), UrgencyTier::Expired);
        assert_eq!(UrgencyTier::classify(1, &t), UrgencyTier::Critical);
        assert_eq!(UrgencyTier::classify(5, &t), UrgencyTier::Critical);
        assert_eq!(UrgencyTier::classify(7, &t), UrgencyTier::Critical);
        assert_eq!(UrgencyTier::classify(8, &t), UrgencyTier::Urgent);
        assert_eq!(UrgencyTier::classify(30, &t), UrgencyTier::Urgent);
        assert_eq!(UrgencyTier::classify(31, &t), UrgencyTier::Warning);
        assert_eq!(UrgencyTier::classify(90, &t), UrgencyTier::Warning);
        assert_eq!(UrgencyTier::classify(91, &t), UrgencyTier::Ok);
        assert_eq!(UrgencyTier::classify(200, &t), UrgencyTier::Ok);
    }

    #[test]
    fn test_warning_period_caps_urgent_tier() {
        let t = TierThresholds {
            critical_days: 7,
            urgent_days: 60,
            warning_days: 40,
        };
        assert_eq!(UrgencyTier::classify(45, &t), UrgencyTier::Ok);
        assert_eq!(UrgencyTier::classify(35, &t), UrgencyTier::Urgent);
    }

    #[test]
    fn test_entry_evaluation() {
        let record = ExpiryRecord::new("Reagents", 4, date(2026, 3, 6)).with_label("Ethanol");
        let entry = ReportEntry::evaluate(record, date(2026, 3, 1), &TierThresholds::default());
        assert_eq!(entry.days_until_expiry, 5);
        assert_eq!(entry.tier, UrgencyTier::Critical);
    }

    #[test]
    fn test_tier_parsing() {
        assert_eq!("Critical".parse::<UrgencyTier>(), Ok(UrgencyTier::Critical));
        assert_eq!(" expired ".parse::<UrgencyTier>(), Ok(UrgencyTier::Expired));
        assert!("soon".parse::<UrgencyTier>().is_err());
    }

    #[test]
    fn test_details_follow_display_order() {
        let mut record = ExpiryRecord::new("Sheet1", 2, date(2026, 1, 1));
        record.set_info(InfoField::Supplier, "Sigma");
        record.set_info(InfoField::Lot, "L-42");
        let details = record.details();
        assert_eq!(details, vec![(InfoField::Lot, "L-42"), (InfoField::Supplier, "Sigma")]);
        assert_eq!(record.display_label(), "Unknown Item");
    }
}
