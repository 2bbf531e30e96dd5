//! Error types for the HTTP API.
//!
//! [`ApiError`] unifies engine rejections and request-shape problems into
//! one enum that renders as the failure body every endpoint shares:
//!
//! ```json
//! { "ok": false, "error": "location_mismatch", "message": "...", "status": 409 }
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fizban_core::EngineError;
use tracing::error;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The world rejected the operation.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The request body or query string could not be understood.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// Stable machine-readable code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Engine(err) => err.code(),
            Self::BadRequest(_) => "bad_request",
        }
    }

    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Engine(err) => match err {
                EngineError::Validation(_) | EngineError::MalformedEffect(_) => {
                    StatusCode::BAD_REQUEST
                }
                EngineError::UnknownLocation(_) | EngineError::NoSuchLane { .. } => {
                    StatusCode::NOT_FOUND
                }
                EngineError::LaneDenied { .. } => StatusCode::FORBIDDEN,
                EngineError::LocationMismatch { .. } => StatusCode::CONFLICT,
                EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = serde_json::json!({
            "ok": false,
            "error": self.code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
