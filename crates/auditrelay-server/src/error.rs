//! API error types.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors a handler can answer with.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body did not parse into the expected payload.
    #[error("Body format invalid.")]
    InvalidBodyFormat,

    /// Anything else.
    #[error("Server is busy, please try again.")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidBodyFormat => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(_: JsonRejection) -> Self {
        Self::InvalidBodyFormat
    }
}

/// Error body: `{ "code": 400, "message": "..." }`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(source) = &self {
            error!(error = %source, "request failed");
        }
        let status = self.status_code();
        let body = ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
