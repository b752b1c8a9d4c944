use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors the command API reports to HTTP clients.
///
/// Commands themselves never fail; only addressing can.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("No Robot found with the name {0}")]
    UnknownRobot(String),

    #[error("No command found with the name {0}")]
    UnknownCommand(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::UnknownRobot(_) | ApiError::UnknownCommand(_) => StatusCode::NOT_FOUND,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
