use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::expiry::{ReportEntry, TierThresholds, UrgencyTier};

/// Number of report entries per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub expired: usize,
    pub critical: usize,
    pub urgent: usize,
    pub warning: usize,
    pub ok: usize,
}

impl TierCounts {
    pub fn from_entries(entries: &[ReportEntry]) -> Self {
        let mut counts = Self::default();
        for entry in entries {
            counts.increment(entry.tier);
        }
        counts
    }

    pub fn increment(&mut self, tier: UrgencyTier) {
        *self.slot(tier) += 1;
    }

    pub fn get(&self, tier: UrgencyTier) -> usize {
        match tier {
            UrgencyTier::Expired => self.expired,
            UrgencyTier::Critical => self.critical,
            UrgencyTier::Urgent => self.urgent,
            UrgencyTier::Warning => self.warning,
            UrgencyTier::Ok => self.ok,
        }
    }

    pub fn total(&self) -> usize {
        self.expired + self.critical + self.urgent + self.warning + self.ok
    }

    fn slot(&mut self, tier: UrgencyTier) -> &mut usize {
        match tier {
            UrgencyTier::Expired => &mut self.expired,
            UrgencyTier::Critical => &mut self.critical,
            UrgencyTier::Urgent => &mut self.urgent,
            UrgencyTier::Warning => &mut self.warning,
            UrgencyTier::Ok => &mut self.ok,
        }
    }
}

/// Counters gathered while scanning a workbook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Rows whose expiry date was parsed.
    pub rows_scanned: usize,
    /// Rows dropped because the date cell could not be parsed.
    pub rows_dropped: usize,
    pub sheets_processed: usize,
    pub sheets_skipped: usize,
    pub items_found: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    SheetExcluded,
    EmptySheet,
    NoDateColumnFound,
    DateParseFailure,
}

/// A non-fatal problem recovered during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanIssue {
    pub sheet: String,
    pub row: Option<usize>,
    pub kind: IssueKind,
    pub message: String,
}

impl ScanIssue {
    pub fn sheet_excluded(sheet: &str) -> Self {
        Self {
            sheet: sheet.to_string(),
            row: None,
            kind: IssueKind::SheetExcluded,
            message: format!("Sheet '{}' is on the exclusion list", sheet),
        }
    }

    pub fn empty_sheet(sheet: &str) -> Self {
        Self {
            sheet: sheet.to_string(),
            row: None,
            kind: IssueKind::EmptySheet,
            message: format!("Sheet '{}' has no data rows", sheet),
        }
    }

    pub fn no_date_column(sheet: &str) -> Self {
        Self {
            sheet: sheet.to_string(),
            row: None,
            kind: IssueKind::NoDateColumnFound,
            message: format!("Sheet '{}': no expiry date column found", sheet),
        }
    }

    pub fn date_parse_failure(sheet: &str, row: usize, value: &str) -> Self {
        Self {
            sheet: sheet.to_string(),
            row: Some(row),
            kind: IssueKind::DateParseFailure,
            message: format!("Sheet '{}' row {}: could not parse date '{}'", sheet, row, value),
        }
    }

    pub fn is_sheet_level(&self) -> bool {
        self.row.is_none()
    }
}

/// The aggregated, sorted result of one scan across all included sheets.
///
/// Entries are ordered by tier severity (most severe first), then by days
/// until expiry. The report cannot be modified after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    id: Uuid,
    filename: String,
    generated_at: DateTime<Utc>,
    reference_date: NaiveDate,
    thresholds: TierThresholds,
    entries: Vec<ReportEntry>,
    counts: TierCounts,
    stats: ScanStats,
    issues: Vec<ScanIssue>,
}

impl ScanReport {
    pub fn new(
        filename: impl Into<String>,
        reference_date: NaiveDate,
        thresholds: TierThresholds,
        mut entries: Vec<ReportEntry>,
        mut stats: ScanStats,
        issues: Vec<ScanIssue>,
    ) -> Self {
        Self::sort_entries(&mut entries);
        stats.items_found = entries.len();
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            generated_at: Utc::now(),
            reference_date,
            thresholds,
            counts: TierCounts::from_entries(&entries),
            entries,
            stats,
            issues,
        }
    }

    /// Stable sort by severity descending, then days ascending.
    pub fn sort_entries(entries: &mut [ReportEntry]) {
        entries.sort_by(|a, b| {
            b.tier
                .severity()
                .cmp(&a.tier.severity())
                .then(a.days_until_expiry.cmp(&b.days_until_expiry))
        });
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn thresholds(&self) -> &TierThresholds {
        &self.thresholds
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn counts(&self) -> &TierCounts {
        &self.counts
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    pub fn issues(&self) -> &[ScanIssue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries_for(&self, tier: UrgencyTier) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(move |e| e.tier == tier)
    }

    /// Issues that caused a whole sheet to be skipped.
    pub fn skipped_sheets(&self) -> impl Iterator<Item = &ScanIssue> {
        self.issues.iter().filter(|i| i.is_sheet_level())
    }
}
