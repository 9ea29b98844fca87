//! JSON API errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::loader::ListLoadFailure;

#[derive(Debug)]
pub enum ApiError {
    /// List index failed to load at startup
    Unavailable(ListLoadFailure),
    UnknownEntity(String),
    /// Detail document missing or unreadable
    DetailUnavailable { id: String, message: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unavailable(failure) => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "error": failure.message, "details": failure.details }),
            ),
            ApiError::UnknownEntity(id) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("Unknown entity: {}", id) }),
            ),
            ApiError::DetailUnavailable { id, message } => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": format!("Detail unavailable for {}", id), "details": message }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
