//! Email Handlers

use axum::{
    extract::{Multipart, State},
    response::Json,
};
use serde::Serialize;
use shelfwatch_alerting::{AlertSettings, RenderedEmail};
use shelfwatch_utils::ShelfwatchError;
use uuid::Uuid;

use super::scan::run_scan;
use super::upload::ScanUpload;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct EmailSentResponse {
    pub report_id: Uuid,
    pub recipient: String,
    pub subject: String,
    pub items: usize,
}

/// Scan, then send one alert email
///
/// POST /api/v1/scan/email
pub async fn email_scan(State(state): State<AppState>, multipart: Multipart) -> ApiResult<Json<EmailSentResponse>> {
    let upload = ScanUpload::from_multipart(multipart).await?;
    let settings = AlertSettings::from_config(&state.config.email, upload.recipient())?;
    let report = run_scan(&state, upload).await?;

    let result = state.mailer.send_report(&report, &settings).await;
    match &result {
        Ok(_) => state.metrics.record_email(true),
        Err(ShelfwatchError::MailSend { .. }) => state.metrics.record_email(false),
        // Nothing was handed to the relay
        Err(_) => {}
    }
    let email = result?;

    Ok(Json(EmailSentResponse {
        report_id: report.id(),
        recipient: email.to,
        subject: email.subject,
        items: report.entries().len(),
    }))
}

/// Render the alert without sending it
///
/// POST /api/v1/scan/email/preview
pub async fn preview_email(State(state): State<AppState>, multipart: Multipart) -> ApiResult<Json<RenderedEmail>> {
    let upload = ScanUpload::from_multipart(multipart).await?;
    let report = run_scan(&state, upload).await?;
    Ok(Json(state.mailer.preview(&report)?))
}
