//! Extraction & Classification
//!
//! Turns the rows of a sheet with known column roles into classified report
//! entries.

use chrono::NaiveDate;
use shelfwatch_models::{
    CellValue, ColumnGuess, ExpiryRecord, ReportEntry, ScanIssue, SheetRow, SheetTable, TierThresholds,
};

use super::dates::DateParser;

/// Per-sheet extraction result
#[derive(Debug, Clone, Default)]
pub struct SheetExtraction {
    pub sheet: String,
    /// Entries inside the warning period, unsorted.
    pub entries: Vec<ReportEntry>,
    /// Rows with a parsed expiry date, reported or not.
    pub rows_scanned: usize,
    pub rows_dropped: usize,
    /// Rows beyond the warning period.
    pub rows_beyond_horizon: usize,
    pub issues: Vec<ScanIssue>,
}

/// Builds and classifies records relative to a fixed reference date.
pub struct RowClassifier<'a> {
    parser: &'a DateParser,
    reference_date: NaiveDate,
    thresholds: TierThresholds,
}

impl<'a> RowClassifier<'a> {
    pub fn new(parser: &'a DateParser, reference_date: NaiveDate, thresholds: TierThresholds) -> Self {
        Self {
            parser,
            reference_date,
            thresholds,
        }
    }

    /// Extract every row of a sheet. Rows with an empty date cell are ignored;
    /// rows whose date cannot be parsed are dropped and reported as issues.
    pub fn extract_sheet(&self, table: &SheetTable, guess: &ColumnGuess) -> SheetExtraction {
        let mut extraction = SheetExtraction {
            sheet: table.name.clone(),
            ..Default::default()
        };

        for row in &table.rows {
            let date_cell = table.cell(row, guess.date_column);
            if date_cell.is_empty() {
                continue;
            }

            let Some(record) = self.build_record(table, row, guess) else {
                extraction.rows_dropped += 1;
                extraction.issues.push(ScanIssue::date_parse_failure(
                    &table.name,
                    row.row_number,
                    &date_cell.display(),
                ));
                continue;
            };

            extraction.rows_scanned += 1;
            let entry = ReportEntry::evaluate(record, self.reference_date, &self.thresholds);
            if entry.tier.is_reportable() {
                extraction.entries.push(entry);
            } else {
                extraction.rows_beyond_horizon += 1;
            }
        }

        extraction
    }

    /// Build the record for one row; `None` when its date cell does not parse.
    pub fn build_record(&self, table: &SheetTable, row: &SheetRow, guess: &ColumnGuess) -> Option<ExpiryRecord> {
        let expiry_date = self.parser.parse(table.cell(row, guess.date_column))?;
        let mut record = ExpiryRecord::new(table.name.clone(), row.row_number, expiry_date);

        record.label = guess
            .label_column
            .map(|c| table.cell(row, c))
            .filter(|c| !c.is_empty())
            .map(CellValue::display)
            .or_else(|| fallback_label(row, guess.date_column));

        for (field, column) in &guess.info_columns {
            let cell = table.cell(row, *column);
            if !cell.is_empty() {
                record.set_info(*field, cell.display());
            }
        }

        Some(record)
    }
}

/// First non-empty text value outside the date column.
fn fallback_label(row: &SheetRow, date_column: usize) -> Option<String> {
    row.cells
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_column)
        .find_map(|(_, cell)| cell.as_text().filter(|t| !t.is_empty()).map(str::to_string))
}
