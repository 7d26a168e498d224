//! Scan Handlers
//!
//! Upload a spreadsheet and get the expiry report back as JSON or as a file.

use axum::{
    extract::{Multipart, Query, State},
    http::header,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use shelfwatch_models::ScanReport;
use shelfwatch_utils::{export_filename, export_report, ExpiryScanner, ExportFormat, ShelfwatchError};
use tracing::info;

use super::upload::ScanUpload;
use crate::error::ApiResult;
use crate::AppState;

/// Scan an upload with the request's options on the blocking pool.
pub async fn run_scan(state: &AppState, upload: ScanUpload) -> ApiResult<ScanReport> {
    let outcome = match upload.scan_options(&state.config.scanner.scan_options()) {
        Ok(options) => {
            let format = upload.format();
            tokio::task::spawn_blocking(move || {
                ExpiryScanner::scan_with_format(&upload.filename, &upload.data, format, &options)
            })
            .await
            .unwrap_or_else(|e| Err(ShelfwatchError::internal(format!("Scan task failed: {}", e))))
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(report) => {
            state.metrics.record_scan(&report);
            Ok(report)
        }
        Err(e) => {
            state.metrics.record_scan_failure();
            Err(e.into())
        }
    }
}

/// Scan an uploaded spreadsheet
///
/// POST /api/v1/scan
pub async fn scan_upload(State(state): State<AppState>, multipart: Multipart) -> ApiResult<Json<ScanReport>> {
    let upload = ScanUpload::from_multipart(multipart).await?;
    let report = run_scan(&state, upload).await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

/// Scan and download the report
///
/// POST /api/v1/scan/export?format=xlsx|csv
pub async fn export_scan(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let format = match query.format.as_deref() {
        Some(raw) => raw.parse::<ExportFormat>()?,
        None => ExportFormat::default(),
    };

    let upload = ScanUpload::from_multipart(multipart).await?;
    let report = run_scan(&state, upload).await?;
    let body = export_report(&report, format)?;
    let filename = export_filename(format);
    info!("Exported {} entries as {}", report.entries().len(), filename);

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}
