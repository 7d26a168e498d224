//! Report Aggregation
//!
//! Merges per-sheet extraction results into one sorted `ScanReport`, and runs
//! the whole scan pipeline over an uploaded file.

use chrono::NaiveDate;
use shelfwatch_models::{ReportEntry, ScanIssue, ScanOptions, ScanReport, ScanStats, SheetTable, TierThresholds};
use tracing::{debug, info, warn};

use super::classifier::{RowClassifier, SheetExtraction};
use super::columns::ColumnInference;
use super::dates::{DateOrderEvidence, DateParser};
use super::loader::{SpreadsheetFormat, WorkbookLoader};
use crate::error::ShelfwatchResult;
use crate::validation::validate_model;

/// Collects per-sheet results and produces the final report.
#[derive(Debug)]
pub struct ReportBuilder {
    filename: String,
    reference_date: NaiveDate,
    thresholds: TierThresholds,
    entries: Vec<ReportEntry>,
    stats: ScanStats,
    issues: Vec<ScanIssue>,
}

impl ReportBuilder {
    pub fn new(filename: impl Into<String>, reference_date: NaiveDate, thresholds: TierThresholds) -> Self {
        Self {
            filename: filename.into(),
            reference_date,
            thresholds,
            entries: Vec::new(),
            stats: ScanStats::default(),
            issues: Vec::new(),
        }
    }

    /// Record a sheet that contributed nothing, with the reason.
    pub fn skip_sheet(&mut self, issue: ScanIssue) {
        self.stats.sheets_skipped += 1;
        self.issues.push(issue);
    }

    pub fn add_sheet(&mut self, extraction: SheetExtraction) {
        self.stats.sheets_processed += 1;
        self.stats.rows_scanned += extraction.rows_scanned;
        self.stats.rows_dropped += extraction.rows_dropped;
        self.entries.extend(extraction.entries);
        self.issues.extend(extraction.issues);
    }

    pub fn build(self) -> ScanReport {
        ScanReport::new(
            self.filename,
            self.reference_date,
            self.thresholds,
            self.entries,
            self.stats,
            self.issues,
        )
    }
}

/// Runs load, inference, extraction and aggregation for one upload.
pub struct ExpiryScanner;

impl ExpiryScanner {
    pub fn scan(filename: &str, data: &[u8], options: &ScanOptions) -> ShelfwatchResult<ScanReport> {
        Self::scan_with_format(filename, data, None, options)
    }

    pub fn scan_with_format(
        filename: &str,
        data: &[u8],
        format: Option<SpreadsheetFormat>,
        options: &ScanOptions,
    ) -> ShelfwatchResult<ScanReport> {
        validate_model(options)?;
        let tables = WorkbookLoader::load(filename, data, format)?;
        Ok(Self::scan_tables(filename, &tables, options))
    }

    /// Scan already-loaded tables. Options are assumed valid.
    pub fn scan_tables(filename: &str, tables: &[SheetTable], options: &ScanOptions) -> ScanReport {
        let reference_date = options.reference_date();
        let thresholds = options.thresholds();
        let mut builder = ReportBuilder::new(filename, reference_date, thresholds);

        let mut included = Vec::with_capacity(tables.len());
        for table in tables {
            if options.is_excluded(&table.name) {
                warn!("Skipping sheet '{}': excluded by configuration", table.name);
                builder.skip_sheet(ScanIssue::sheet_excluded(&table.name));
            } else if table.is_empty() {
                warn!("Skipping sheet '{}': no data rows", table.name);
                builder.skip_sheet(ScanIssue::empty_sheet(&table.name));
            } else {
                included.push(table);
            }
        }

        let evidence = DateOrderEvidence::from_tables(included.iter().copied());
        let order = if options.date_order_fixed {
            options.date_order
        } else {
            evidence.preferred(options.date_order)
        };
        let parser = DateParser::new(order);
        debug!(
            "Date order {:?} (day-first evidence {}, month-first evidence {})",
            parser.order(),
            evidence.day_first,
            evidence.month_first
        );

        let inference = ColumnInference::new()
            .with_sample_size(options.sample_size)
            .with_reference_date(reference_date);
        let classifier = RowClassifier::new(&parser, reference_date, thresholds);

        for table in included {
            let Some(guess) = inference.infer(table, &parser) else {
                warn!("Skipping sheet '{}': no expiry date column found", table.name);
                builder.skip_sheet(ScanIssue::no_date_column(&table.name));
                continue;
            };

            debug!(
                "Sheet '{}': date column '{}' via {:?}, label column {:?}",
                table.name,
                guess.date_header,
                guess.method,
                guess.label_column.and_then(|c| table.header(c)),
            );

            let extraction = classifier.extract_sheet(table, &guess);
            debug!(
                "Sheet '{}': {} dated rows, {} reported, {} beyond horizon, {} dropped",
                table.name,
                extraction.rows_scanned,
                extraction.entries.len(),
                extraction.rows_beyond_horizon,
                extraction.rows_dropped
            );
            builder.add_sheet(extraction);
        }

        let report = builder.build();
        let stats = report.stats();
        info!(
            "Scanned {}: {} items expiring within {} days ({} sheets processed, {} skipped, {} rows dropped)",
            filename,
            stats.items_found,
            thresholds.warning_days,
            stats.sheets_processed,
            stats.sheets_skipped,
            stats.rows_dropped
        );
        report
    }
}
