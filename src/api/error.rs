use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::engine::{EngineError, RequestError};

/// Errors that change the HTTP status. Engine failures are not among
/// them; those are reported with a 200 and `success: false`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] RequestError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                Json(json!({"success": false, "error": e.to_string()})),
            )
                .into_response(),
            ApiError::Internal(detail) => {
                error!(error = %detail, "recommendation request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"success": false, "error": "Internal server error"})),
                )
                    .into_response()
            }
        }
    }
}
