//! Shelfwatch Scan Integration Tests
//!
//! End-to-end scans of generated workbooks and CSV uploads.

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use shelfwatch_models::{date_to_serial, DetectionMethod, IssueKind, ScanOptions, UrgencyTier};
use shelfwatch_utils::{
    export_report, read_export, ColumnInference, DateParser, ExpiryScanner, ExportFormat, WorkbookLoader,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn options() -> ScanOptions {
    ScanOptions::default().with_reference_date(date(2026, 3, 1))
}

/// A lab inventory with a native-date column, a text-date sheet and an archive.
fn inventory_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("dd/mm/yyyy");

    let mut stock = Worksheet::new();
    stock.set_name("Chemicals").unwrap();
    for (col, header) in ["Product Name", "Lot #", "Storage", "Expiration"].iter().enumerate() {
        stock.write_string(0, col as u16, *header).unwrap();
    }
    let rows = [
        ("Ethanol 96%", "E-101", "Cabinet 2", Some(date(2026, 3, 6))),
        ("Sodium Azide", "S-7", "Fridge", Some(date(2026, 9, 17))),
        ("Tris Buffer", "T-33", "Shelf 4", Some(date(2026, 2, 10))),
        ("Acetone", "A-5", "Cabinet 1", None),
        ("Methanol", "M-12", "Cabinet 2", Some(date(2026, 3, 25))),
    ];
    for (idx, (name, lot, location, expiry)) in rows.iter().enumerate() {
        let row = idx as u32 + 1;
        stock.write_string(row, 0, *name).unwrap();
        stock.write_string(row, 1, *lot).unwrap();
        stock.write_string(row, 2, *location).unwrap();
        match expiry {
            Some(d) => {
                stock
                    .write_number_with_format(row, 3, date_to_serial(*d), &date_format)
                    .unwrap();
            }
            None => {
                stock.write_string(row, 3, "N/A").unwrap();
            }
        }
    }

    let mut kits = Worksheet::new();
    kits.set_name("Kits").unwrap();
    kits.write_string(0, 0, "Kit").unwrap();
    kits.write_string(0, 1, "Received").unwrap();
    kits.write_string(0, 2, "Use By").unwrap();
    kits.write_string(1, 0, "PCR Master Mix").unwrap();
    kits.write_string(1, 1, "2025-12-01").unwrap();
    kits.write_string(1, 2, "2026-04-20").unwrap();

    let mut archive = Worksheet::new();
    archive.set_name("Archive").unwrap();
    archive.write_string(0, 0, "Item").unwrap();
    archive.write_string(0, 1, "Expiry").unwrap();
    archive.write_string(1, 0, "Old Stock").unwrap();
    archive.write_string(1, 1, "2026-03-02").unwrap();

    workbook.push_worksheet(stock);
    workbook.push_worksheet(kits);
    workbook.push_worksheet(archive);
    workbook.save_to_buffer().unwrap()
}

#[test]
fn test_scan_workbook_end_to_end() {
    let data = inventory_workbook();
    let options = options().with_excluded_sheets(["Archive"]);
    let report = ExpiryScanner::scan("inventory.xlsx", &data, &options).unwrap();

    let summary: Vec<_> = report
        .entries()
        .iter()
        .map(|e| (e.record.display_label(), e.days_until_expiry, e.tier))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Tris Buffer", -19, UrgencyTier::Expired),
            ("Ethanol 96%", 5, UrgencyTier::Critical),
            ("Methanol", 24, UrgencyTier::Urgent),
            ("PCR Master Mix", 50, UrgencyTier::Warning),
        ]
    );

    // Sodium Azide is 200 days out, beyond the 90-day warning period
    assert!(report.entries().iter().all(|e| e.record.display_label() != "Sodium Azide"));

    let ethanol = &report.entries()[1];
    assert_eq!(ethanol.record.sheet, "Chemicals");
    assert_eq!(ethanol.record.row_number, 2);
    assert_eq!(ethanol.record.lot.as_deref(), Some("E-101"));
    assert_eq!(ethanol.record.location.as_deref(), Some("Cabinet 2"));

    let stats = report.stats();
    assert_eq!(stats.sheets_processed, 2);
    assert_eq!(stats.sheets_skipped, 1);
    assert_eq!(stats.rows_dropped, 1);
    assert_eq!(stats.rows_scanned, 5);
    assert_eq!(stats.items_found, 4);

    // "N/A" is dropped, the rest of the sheet still counts
    let parse_failures: Vec<_> = report
        .issues()
        .iter()
        .filter(|i| i.kind == IssueKind::DateParseFailure)
        .collect();
    assert_eq!(parse_failures.len(), 1);
    assert_eq!(parse_failures[0].sheet, "Chemicals");
    assert_eq!(parse_failures[0].row, Some(5));

    assert!(report
        .entries()
        .iter()
        .all(|e| e.record.sheet != "Archive"));
}

#[test]
fn test_use_by_header_beats_other_dates() {
    let data = inventory_workbook();
    let tables = WorkbookLoader::load("inventory.xlsx", &data, None).unwrap();
    let kits = tables.iter().find(|t| t.name == "Kits").unwrap();

    let guess = ColumnInference::new().infer(kits, &DateParser::default()).unwrap();
    assert_eq!(guess.date_header, "Use By");
    assert_eq!(guess.method, DetectionMethod::Header);
    assert_eq!(guess.label_column, Some(0));
}

#[test]
fn test_csv_without_date_headers_is_sniffed() {
    let csv = "Reagent,Notes,When\n\
               Glycerol,bottle 1,15 Mar 2026\n\
               Agarose,,30-Mar-26\n\
               Ethidium,opened,N/A\n\
               Ampicillin,,2026/05/20\n";
    let report = ExpiryScanner::scan("freezer.csv", csv.as_bytes(), &options()).unwrap();

    let labels: Vec<_> = report.entries().iter().map(|e| e.record.display_label()).collect();
    assert_eq!(labels, vec!["Glycerol", "Agarose", "Ampicillin"]);
    assert!(report.entries().iter().all(|e| e.record.sheet == "freezer"));
    assert_eq!(report.stats().rows_dropped, 1);
}

#[test]
fn test_month_name_dates_in_csv() {
    let csv = "Item,Expiry\nEthanol,Dec 2026\nAcetone,March 2026\nWater,2026-03-06\n";
    let report = ExpiryScanner::scan("stock.csv", csv.as_bytes(), &options()).unwrap();

    let found: Vec<_> = report
        .entries()
        .iter()
        .map(|e| (e.record.display_label(), e.record.expiry_date, e.tier))
        .collect();
    assert_eq!(
        found,
        vec![
            ("Water", date(2026, 3, 6), UrgencyTier::Critical),
            ("Acetone", date(2026, 3, 31), UrgencyTier::Urgent),
        ]
    );
    assert_eq!(report.stats().rows_dropped, 0);
}

#[test]
fn test_numeric_codes_are_not_taken_for_expiry_dates() {
    let csv = "Code,Thing,When\n\
               30001,Ethanol,2026-03-06\n\
               30002,Acetone,2026-03-20\n\
               30003,Water,2026-09-17\n";
    let report = ExpiryScanner::scan("stock.csv", csv.as_bytes(), &options()).unwrap();

    let found: Vec<_> = report
        .entries()
        .iter()
        .map(|e| (e.record.display_label(), e.days_until_expiry))
        .collect();
    assert_eq!(found, vec![("Ethanol", 5), ("Acetone", 19)]);
}

#[test]
fn test_rescan_is_deterministic() {
    let data = inventory_workbook();
    let first = ExpiryScanner::scan("inventory.xlsx", &data, &options()).unwrap();
    let second = ExpiryScanner::scan("inventory.xlsx", &data, &options()).unwrap();

    assert_eq!(first.entries(), second.entries());
    assert_eq!(first.counts(), second.counts());
    assert_ne!(first.id(), second.id());
}

#[test]
fn test_export_round_trip_preserves_entries() {
    let data = inventory_workbook();
    let report = ExpiryScanner::scan("inventory.xlsx", &data, &options()).unwrap();
    let expected: Vec<_> = report
        .entries()
        .iter()
        .map(|e| (e.record.display_label().to_string(), e.record.expiry_date, e.tier))
        .collect();

    for format in [ExportFormat::Xlsx, ExportFormat::Csv] {
        let bytes = export_report(&report, format).unwrap();
        let filename = format!("report.{}", format.extension());
        let rows = read_export(&filename, &bytes).unwrap();
        let actual: Vec<_> = rows
            .into_iter()
            .map(|r| (r.label, r.expiry_date, r.tier))
            .collect();
        assert_eq!(actual, expected, "round trip through {:?}", format);
    }
}

#[test]
fn test_unreadable_upload() {
    let err = ExpiryScanner::scan("inventory.xlsx", b"definitely not a workbook", &options()).unwrap_err();
    assert_eq!(err.error_code(), "FILE_READ_ERROR");
}
