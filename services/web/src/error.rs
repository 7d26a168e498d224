use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shelfwatch_utils::{ErrorResponse, ShelfwatchError};
use tracing::{error, warn};

/// Handler error; renders as a JSON `ErrorResponse` with the matching status.
#[derive(Debug)]
pub struct ApiError(pub ShelfwatchError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<ShelfwatchError> for ApiError {
    fn from(error: ShelfwatchError) -> Self {
        Self(error)
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(error: axum::extract::multipart::MultipartError) -> Self {
        Self(ShelfwatchError::validation("file", format!("Failed to read upload: {}", error)))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }

        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}
