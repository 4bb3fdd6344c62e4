//! HTTP errors of the auth-request service

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use zonegate_core::ZoneGateError;

/// Result type for request handlers
pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by request handlers
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No authenticated subject
    #[error("authentication required: {0}")]
    Unauthorized(String),

    /// Subject may not perform the request
    #[error("access denied: {0}")]
    Forbidden(String),

    /// Requested zone does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed request
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "status": "failure",
            "message": self.to_string(),
            "code": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<ZoneGateError> for Error {
    fn from(e: ZoneGateError) -> Self {
        match e {
            ZoneGateError::NotFound { message } => Error::NotFound(message),
            ZoneGateError::Invalid { message } => Error::BadRequest(message),
            other => Error::Internal(other.to_string()),
        }
    }
}
