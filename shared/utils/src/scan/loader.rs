//! Workbook Loader
//!
//! Reads CSV, XLSX, XLS and ODS uploads into per-sheet tables.

use calamine::{open_workbook_from_rs, DataType, Ods, Reader, Xls, Xlsx};
use serde::{Deserialize, Serialize};
use shelfwatch_models::{CellValue, SheetTable};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

use crate::error::{ShelfwatchError, ShelfwatchResult};

/// Supported spreadsheet formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpreadsheetFormat {
    Csv,
    Xlsx,
    Xls,
    Ods,
}

impl SpreadsheetFormat {
    /// Detect format from a file name's extension
    pub fn from_extension(filename: &str) -> Option<Self> {
        let ext = Path::new(filename).extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" | "txt" => Some(Self::Csv),
            "xlsx" | "xlsm" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "ods" => Some(Self::Ods),
            _ => None,
        }
    }

    /// Detect format from content type header
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        match essence {
            "text/csv" | "application/csv" => Some(Self::Csv),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => Some(Self::Xlsx),
            "application/vnd.ms-excel" => Some(Self::Xls),
            "application/vnd.oasis.opendocument.spreadsheet" => Some(Self::Ods),
            _ => None,
        }
    }

    /// Guess from leading bytes. Zip containers are assumed to be XLSX.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        match data {
            [0x50, 0x4B, 0x03, 0x04, ..] => Some(Self::Xlsx),
            [0xD0, 0xCF, 0x11, 0xE0, ..] => Some(Self::Xls),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
            Self::Ods => "ods",
        }
    }
}

/// Loads uploaded bytes into sheet tables. The first row of every sheet is
/// treated as its header row.
pub struct WorkbookLoader;

impl WorkbookLoader {
    pub fn load(
        filename: &str,
        data: &[u8],
        format: Option<SpreadsheetFormat>,
    ) -> ShelfwatchResult<Vec<SheetTable>> {
        if data.is_empty() {
            return Err(ShelfwatchError::file_read(filename, "Uploaded file is empty"));
        }

        let format = format
            .or_else(|| SpreadsheetFormat::from_extension(filename))
            .or_else(|| SpreadsheetFormat::sniff(data))
            .ok_or_else(|| {
                ShelfwatchError::file_read(
                    filename,
                    "Unsupported file type. Upload a CSV, XLSX, XLS or ODS file",
                )
            })?;

        debug!("Loading {} as {:?} ({} bytes)", filename, format, data.len());

        let tables = match format {
            SpreadsheetFormat::Csv => vec![Self::load_csv(filename, data)?],
            SpreadsheetFormat::Xlsx => {
                let workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(data))
                    .map_err(|e| open_error(filename, e))?;
                Self::load_workbook(filename, workbook)?
            }
            SpreadsheetFormat::Xls => {
                let workbook: Xls<_> = open_workbook_from_rs(Cursor::new(data))
                    .map_err(|e| open_error(filename, e))?;
                Self::load_workbook(filename, workbook)?
            }
            SpreadsheetFormat::Ods => {
                let workbook: Ods<_> = open_workbook_from_rs(Cursor::new(data))
                    .map_err(|e| open_error(filename, e))?;
                Self::load_workbook(filename, workbook)?
            }
        };

        if tables.is_empty() {
            return Err(ShelfwatchError::file_read(filename, "Workbook contains no sheets"));
        }
        Ok(tables)
    }

    fn load_workbook<RS, R>(filename: &str, mut workbook: R) -> ShelfwatchResult<Vec<SheetTable>>
    where
        RS: std::io::Read + std::io::Seek,
        R: Reader<RS>,
        R::Error: std::fmt::Display,
    {
        let sheet_names = workbook.sheet_names().to_vec();
        let mut tables = Vec::with_capacity(sheet_names.len());

        for name in sheet_names {
            let range = match workbook.worksheet_range(&name) {
                Some(Ok(range)) => range,
                Some(Err(e)) => {
                    return Err(ShelfwatchError::file_read(
                        filename,
                        format!("Failed to read sheet '{}': {}", name, e),
                    ))
                }
                None => continue,
            };

            let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
            let grid: Vec<Vec<CellValue>> = range
                .rows()
                .map(|row| row.iter().map(convert_cell).collect())
                .collect();

            tables.push(table_from_grid(name, grid, first_row + 1));
        }

        Ok(tables)
    }

    fn load_csv(filename: &str, data: &[u8]) -> ShelfwatchResult<SheetTable> {
        let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_reader(data);

        let mut grid = Vec::new();
        for result in reader.byte_records() {
            let record = result.map_err(|e| {
                ShelfwatchError::file_read(filename, format!("Failed to parse CSV: {}", e))
            })?;
            grid.push(
                record
                    .iter()
                    .map(|field| CellValue::text(String::from_utf8_lossy(field).into_owned()))
                    .collect(),
            );
        }

        let name = Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("Sheet1");

        Ok(table_from_grid(name.to_string(), grid, 1))
    }
}

/// Leading blank rows are skipped so the header is the first row with content.
fn table_from_grid(name: String, grid: Vec<Vec<CellValue>>, first_row_number: usize) -> SheetTable {
    let leading_blank = grid
        .iter()
        .take_while(|row| row.iter().all(CellValue::is_empty))
        .count();
    let grid = grid.into_iter().skip(leading_blank).collect();
    SheetTable::from_grid(name, grid, first_row_number + leading_blank)
}

fn open_error(filename: &str, error: impl std::fmt::Display) -> ShelfwatchError {
    ShelfwatchError::file_read(filename, format!("Failed to open workbook: {}", error))
}

/// Convert a calamine cell into the scanner's cell model.
pub fn convert_cell(data: &DataType) -> CellValue {
    match data {
        DataType::Empty => CellValue::Empty,
        DataType::String(s) => CellValue::text(s.clone()),
        DataType::Int(i) => CellValue::Number(*i as f64),
        DataType::Float(f) => CellValue::Number(*f),
        DataType::Bool(b) => CellValue::Bool(*b),
        DataType::DateTime(serial) => CellValue::DateSerial(*serial),
        DataType::DateTimeIso(s) => CellValue::text(s.clone()),
        DataType::Error(e) => CellValue::Error(format!("#{}", e)),
        other => CellValue::text(other.to_string()),
    }
}
