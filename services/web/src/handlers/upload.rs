//! Multipart Upload Parsing
//!
//! Reads the uploaded spreadsheet and the optional scan fields of the form.

use axum::extract::Multipart;
use chrono::NaiveDate;
use shelfwatch_models::{parse_sheet_list, DateOrder, ScanOptions};
use shelfwatch_utils::{parse_field, validate_model, ShelfwatchError, ShelfwatchResult, SpreadsheetFormat};
use std::collections::HashMap;

use crate::error::ApiResult;

pub const FILE_FIELD: &str = "file";

/// An uploaded file plus the text fields sent with it.
#[derive(Debug, Clone)]
pub struct ScanUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
    pub fields: HashMap<String, String>,
}

impl ScanUpload {
    pub async fn from_multipart(mut multipart: Multipart) -> ApiResult<Self> {
        let mut file: Option<(String, Option<String>, Vec<u8>)> = None;
        let mut fields = HashMap::new();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == FILE_FIELD {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "upload".to_string());
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field.bytes().await?;
                file = Some((filename, content_type, data.to_vec()));
            } else {
                fields.insert(name, field.text().await?);
            }
        }

        let (filename, content_type, data) =
            file.ok_or_else(|| ShelfwatchError::validation(FILE_FIELD, "No file provided"))?;

        Ok(Self {
            filename,
            content_type,
            data,
            fields,
        })
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Extension first, then the declared content type; `None` leaves it to sniffing.
    pub fn format(&self) -> Option<SpreadsheetFormat> {
        SpreadsheetFormat::from_extension(&self.filename).or_else(|| {
            self.content_type
                .as_deref()
                .and_then(SpreadsheetFormat::from_content_type)
        })
    }

    /// Configured defaults overridden by whatever the form supplied.
    pub fn scan_options(&self, defaults: &ScanOptions) -> ShelfwatchResult<ScanOptions> {
        let mut options = defaults.clone();

        if let Some(days) = parse_field::<u32>("warning_days", self.field("warning_days"))? {
            options.warning_days = days;
        }
        if let Some(days) = parse_field::<u32>("critical_days", self.field("critical_days"))? {
            options.critical_days = days;
        }
        if let Some(days) = parse_field::<u32>("urgent_days", self.field("urgent_days"))? {
            options.urgent_days = days;
        }
        if let Some(order) = parse_field::<DateOrder>("date_order", self.field("date_order"))? {
            options = options.with_fixed_date_order(order);
        }
        if let Some(date) = parse_field::<NaiveDate>("reference_date", self.field("reference_date"))? {
            options.reference_date = Some(date);
        }
        if let Some(raw) = self.field("exclude_sheets") {
            options.exclude_sheets = parse_sheet_list(raw);
        }

        validate_model(&options)?;
        Ok(options)
    }

    pub fn recipient(&self) -> Option<&str> {
        self.field("recipient")
    }
}
