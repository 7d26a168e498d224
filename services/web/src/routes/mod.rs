use axum::{routing::post, Router};

use crate::{handlers::*, AppState};

pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .route("/scan", post(scan_upload))
        .route("/scan/export", post(export_scan))
        .route("/scan/email", post(email_scan))
        .route("/scan/email/preview", post(preview_email))
}
