//! # Shelfwatch Core Domain Models
//!
//! Types shared by the expiry scanner, the alerting crate and the web service.
//!
//! ## Key Models
//!
//! - **CellValue / SheetTable**: raw spreadsheet contents, one table per sheet
//! - **ColumnGuess**: inferred roles of a sheet's columns (expiry date, item label, extra info)
//! - **ExpiryRecord**: facts extracted from one row that has a resolvable expiry date
//! - **UrgencyTier**: severity bucket computed from days-until-expiry
//! - **ScanReport**: the sorted, immutable result of one scan
//! - **ScanOptions**: request-scoped scan settings, validated with the validator crate

pub mod cell;
pub mod sheet;
pub mod columns;
pub mod expiry;
pub mod report;
pub mod options;

#[cfg(test)]
pub mod property_tests;

pub use cell::*;
pub use sheet::*;
pub use columns::*;
pub use expiry::*;
pub use report::*;
pub use options::*;
