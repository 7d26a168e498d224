//! Report Export
//!
//! Writes a scan report as a downloadable XLSX or CSV file, and reads such a
//! file back.

use chrono::{Local, NaiveDate};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde::{Deserialize, Serialize};
use shelfwatch_models::{date_to_serial, ReportEntry, ScanReport, UrgencyTier};
use std::str::FromStr;

use super::dates::DateParser;
use super::loader::{SpreadsheetFormat, WorkbookLoader};
use crate::error::{ShelfwatchError, ShelfwatchResult};

pub const EXPORT_SHEET_NAME: &str = "Expiring Items";

pub const EXPORT_HEADERS: [&str; 11] = [
    "Sheet",
    "Row",
    "Item",
    "Expiry Date",
    "Days Left",
    "Urgency",
    "Lot",
    "Location",
    "Catalog",
    "Quantity",
    "Supplier",
];

const COLUMN_WIDTHS: [f64; 11] = [16.0, 6.0, 32.0, 12.0, 10.0, 10.0, 14.0, 16.0, 14.0, 10.0, 18.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }
}

impl Default for ExportFormat {
    fn default() -> Self {
        Self::Xlsx
    }
}

impl FromStr for ExportFormat {
    type Err = ShelfwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            other => Err(ShelfwatchError::validation(
                "format",
                format!("Unsupported export format '{}', expected xlsx or csv", other),
            )),
        }
    }
}

/// Download name, e.g. `expiry_report_20260301_093000.xlsx`.
pub fn export_filename(format: ExportFormat) -> String {
    format!(
        "expiry_report_{}.{}",
        Local::now().format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

pub fn export_report(report: &ScanReport, format: ExportFormat) -> ShelfwatchResult<Vec<u8>> {
    match format {
        ExportFormat::Xlsx => export_xlsx(report),
        ExportFormat::Csv => export_csv(report),
    }
}

fn row_values(entry: &ReportEntry) -> [String; 11] {
    let record = &entry.record;
    let optional = |v: &Option<String>| v.clone().unwrap_or_default();
    [
        record.sheet.clone(),
        record.row_number.to_string(),
        record.display_label().to_string(),
        record.expiry_date.format("%Y-%m-%d").to_string(),
        entry.days_until_expiry.to_string(),
        entry.tier.title().to_string(),
        optional(&record.lot),
        optional(&record.location),
        optional(&record.catalog),
        optional(&record.quantity),
        optional(&record.supplier),
    ]
}

pub fn export_csv(report: &ScanReport) -> ShelfwatchResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADERS)?;
    for entry in report.entries() {
        writer.write_record(row_values(entry))?;
    }
    writer
        .into_inner()
        .map_err(|e| ShelfwatchError::export(format!("Failed to finish CSV export: {}", e)))
}

pub fn export_xlsx(report: &ScanReport) -> ShelfwatchResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name(EXPORT_SHEET_NAME)?;

    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    for (col, (header, width)) in EXPORT_HEADERS.iter().zip(COLUMN_WIDTHS).enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        worksheet.set_column_width(col as u16, width)?;
    }

    for (idx, entry) in report.entries().iter().enumerate() {
        let row = idx as u32 + 1;
        let values = row_values(entry);
        for (col, value) in values.iter().enumerate() {
            let col = col as u16;
            match col {
                1 => {
                    worksheet.write_number(row, col, entry.record.row_number as f64)?;
                }
                3 => {
                    worksheet.write_number_with_format(
                        row,
                        col,
                        date_to_serial(entry.record.expiry_date),
                        &date_format,
                    )?;
                }
                4 => {
                    worksheet.write_number(row, col, entry.days_until_expiry as f64)?;
                }
                _ if value.is_empty() => {}
                _ => {
                    worksheet.write_string(row, col, value.as_str())?;
                }
            }
        }
    }

    workbook.push_worksheet(worksheet);
    Ok(workbook.save_to_buffer()?)
}

/// One row of a previously exported report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedRow {
    pub sheet: String,
    pub row_number: usize,
    pub label: String,
    pub expiry_date: NaiveDate,
    pub days_left: i64,
    pub tier: UrgencyTier,
}

/// Read an exported report back. The format follows the file name.
pub fn read_export(filename: &str, data: &[u8]) -> ShelfwatchResult<Vec<ExportedRow>> {
    let tables = WorkbookLoader::load(filename, data, SpreadsheetFormat::from_extension(filename))?;
    let table = tables
        .into_iter()
        .next()
        .ok_or_else(|| ShelfwatchError::file_read(filename, "Export contains no sheets"))?;

    let column = |name: &str| {
        table
            .headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| ShelfwatchError::file_read(filename, format!("Missing column '{}'", name)))
    };
    let sheet_col = column("Sheet")?;
    let row_col = column("Row")?;
    let item_col = column("Item")?;
    let date_col = column("Expiry Date")?;
    let days_col = column("Days Left")?;
    let tier_col = column("Urgency")?;

    let parser = DateParser::default();
    let invalid = |row: usize, what: &str| {
        ShelfwatchError::file_read(filename, format!("Row {}: invalid {}", row, what))
    };

    let mut rows = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let n = row.row_number;
        rows.push(ExportedRow {
            sheet: table.cell(row, sheet_col).display(),
            row_number: table
                .cell(row, row_col)
                .display()
                .parse()
                .map_err(|_| invalid(n, "row number"))?,
            label: table.cell(row, item_col).display(),
            expiry_date: parser
                .parse(table.cell(row, date_col))
                .ok_or_else(|| invalid(n, "expiry date"))?,
            days_left: table
                .cell(row, days_col)
                .display()
                .parse()
                .map_err(|_| invalid(n, "days left"))?,
            tier: table
                .cell(row, tier_col)
                .display()
                .parse()
                .map_err(|_| invalid(n, "urgency"))?,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfwatch_models::{ExpiryRecord, ScanStats, TierThresholds};

    fn report() -> ScanReport {
        let reference = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let thresholds = TierThresholds::default();
        let mut record = ExpiryRecord::new("Stock", 4, NaiveDate::from_ymd_opt(2026, 3, 20).unwrap())
            .with_label("Acetone, HPLC grade");
        record.lot = Some("L-22".into());
        let expired = ExpiryRecord::new("Stock", 2, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        ScanReport::new(
            "stock.xlsx",
            reference,
            thresholds,
            vec![
                ReportEntry::evaluate(record, reference, &thresholds),
                ReportEntry::evaluate(expired, reference, &thresholds),
            ],
            ScanStats::default(),
            Vec::new(),
        )
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("xlsx".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_export_filename() {
        let name = export_filename(ExportFormat::Csv);
        assert!(name.starts_with("expiry_report_"));
        assert!(name.ends_with(".csv"));
        assert_eq!(name.len(), "expiry_report_20260301_093000.csv".len());
    }

    #[test]
    fn test_csv_export() {
        let data = export_csv(&report()).unwrap();
        let text = String::from_utf8(data).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Sheet,Row,Item,Expiry Date,Days Left,Urgency,Lot,Location,Catalog,Quantity,Supplier")
        );
        assert_eq!(lines.next(), Some("Stock,2,Unknown Item,2026-02-01,-28,EXPIRED,,,,,"));
        assert_eq!(
            lines.next(),
            Some("Stock,4,\"Acetone, HPLC grade\",2026-03-20,19,URGENT,L-22,,,,")
        );
    }

    #[test]
    fn test_xlsx_round_trip() {
        let data = export_xlsx(&report()).unwrap();
        let rows = read_export("report.xlsx", &data).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].tier, UrgencyTier::Expired);
        assert_eq!(rows[1].label, "Acetone, HPLC grade");
        assert_eq!(rows[1].expiry_date, NaiveDate::from_ymd_opt(2026, 3, 20).unwrap());
        assert_eq!(rows[1].days_left, 19);
        assert_eq!(rows[1].row_number, 4);
    }
}
