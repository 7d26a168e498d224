//! Expiry Scanner
//!
//! Loading, date parsing, column inference, classification, aggregation and
//! export for uploaded spreadsheets.

pub mod classifier;
pub mod columns;
pub mod dates;
pub mod export;
pub mod loader;
pub mod report;

pub use classifier::{RowClassifier, SheetExtraction};
pub use columns::ColumnInference;
pub use dates::{DateOrderEvidence, DateParser};
pub use export::{
    export_csv, export_filename, export_report, export_xlsx, read_export, ExportFormat, ExportedRow,
    EXPORT_HEADERS,
};
pub use loader::{SpreadsheetFormat, WorkbookLoader};
pub use report::{ExpiryScanner, ReportBuilder};
