use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::expiry::TierThresholds;

/// Which component comes first in an ambiguous numeric date like `03/04/2026`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    DayFirst,
    #[default]
    MonthFirst,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown date order: {0} (expected day_first or month_first)")]
pub struct ParseDateOrderError(pub String);

impl FromStr for DateOrder {
    type Err = ParseDateOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "day_first" | "dayfirst" | "dmy" => Ok(Self::DayFirst),
            "month_first" | "monthfirst" | "mdy" => Ok(Self::MonthFirst),
            _ => Err(ParseDateOrderError(s.to_string())),
        }
    }
}

/// Request-scoped settings for one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_thresholds"))]
pub struct ScanOptions {
    #[validate(range(min = 30, max = 180))]
    pub warning_days: u32,
    #[validate(range(min = 1))]
    pub critical_days: u32,
    pub urgent_days: u32,
    pub exclude_sheets: Vec<String>,
    /// Non-empty cells sampled per column when sniffing for dates.
    #[validate(range(min = 1, max = 1000))]
    pub sample_size: usize,
    /// Used for ambiguous dates when the file gives no consistent hint.
    pub date_order: DateOrder,
    /// Apply `date_order` even when the file suggests the other order.
    #[serde(default)]
    pub date_order_fixed: bool,
    /// Defaults to today when unset.
    pub reference_date: Option<NaiveDate>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        let thresholds = TierThresholds::default();
        Self {
            warning_days: thresholds.warning_days,
            critical_days: thresholds.critical_days,
            urgent_days: thresholds.urgent_days,
            exclude_sheets: Vec::new(),
            sample_size: 20,
            date_order: DateOrder::default(),
            date_order_fixed: false,
            reference_date: None,
        }
    }
}

fn validate_thresholds(options: &ScanOptions) -> Result<(), ValidationError> {
    if options.critical_days >= options.urgent_days {
        let mut error = ValidationError::new("thresholds");
        error.message = Some("critical_days must be lower than urgent_days".into());
        return Err(error);
    }
    Ok(())
}

impl ScanOptions {
    pub fn thresholds(&self) -> TierThresholds {
        TierThresholds {
            critical_days: self.critical_days,
            urgent_days: self.urgent_days,
            warning_days: self.warning_days,
        }
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Case-insensitive match against the exclusion list.
    pub fn is_excluded(&self, sheet: &str) -> bool {
        let sheet = sheet.trim();
        self.exclude_sheets
            .iter()
            .any(|s| s.trim().eq_ignore_ascii_case(sheet))
    }

    pub fn with_warning_days(mut self, days: u32) -> Self {
        self.warning_days = days;
        self
    }

    pub fn with_excluded_sheets<I, S>(mut self, sheets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_sheets = sheets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn with_date_order(mut self, order: DateOrder) -> Self {
        self.date_order = order;
        self
    }

    /// Use `order` for every ambiguous date, whatever the file suggests.
    pub fn with_fixed_date_order(mut self, order: DateOrder) -> Self {
        self.date_order = order;
        self.date_order_fixed = true;
        self
    }
}

/// Split a comma-separated sheet list, dropping blanks.
pub fn parse_sheet_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_valid() {
        assert!(ScanOptions::default().validate().is_ok());
    }

    #[test]
    fn test_warning_period_range() {
        assert!(ScanOptions::default().with_warning_days(29).validate().is_err());
        assert!(ScanOptions::default().with_warning_days(181).validate().is_err());
        assert!(ScanOptions::default().with_warning_days(180).validate().is_ok());
    }

    #[test]
    fn test_thresholds_must_be_ordered() {
        let options = ScanOptions {
            critical_days: 30,
            urgent_days: 30,
            ..ScanOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_exclusion_is_case_insensitive() {
        let options = ScanOptions::default().with_excluded_sheets(parse_sheet_list("Archive, Template,, "));
        assert_eq!(options.exclude_sheets, vec!["Archive", "Template"]);
        assert!(options.is_excluded("archive"));
        assert!(options.is_excluded(" TEMPLATE "));
        assert!(!options.is_excluded("Stock"));
    }

    #[test]
    fn test_date_order_parsing() {
        assert_eq!("day-first".parse::<DateOrder>(), Ok(DateOrder::DayFirst));
        assert_eq!("MDY".parse::<DateOrder>(), Ok(DateOrder::MonthFirst));
        assert!("yearfirst".parse::<DateOrder>().is_err());
    }
}
