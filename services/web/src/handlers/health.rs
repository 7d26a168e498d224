use axum::{extract::State, http::StatusCode, response::{IntoResponse, Json, Response}};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "shelfwatch-web",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    if !state.config.monitoring.metrics_enabled {
        return StatusCode::NOT_FOUND.into_response();
    }
    state.metrics.render().into_response()
}
