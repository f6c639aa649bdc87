use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use crm_core::error::{CoreError, FormatError};
use crm_core::import::{PreviewError, SessionError};
use serde_json::json;
use uuid::Uuid;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `crm_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An illegal import session transition.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// No live import session with this id (never created, cancelled or expired).
    #[error("Import session {0} not found")]
    SessionNotFound(Uuid),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The upload exceeded the configured body limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<FormatError> for AppError {
    fn from(err: FormatError) -> Self {
        AppError::Core(CoreError::Format(err))
    }
}

impl From<PreviewError> for AppError {
    fn from(err: PreviewError) -> Self {
        match err {
            PreviewError::Session(e) => AppError::Session(e),
            PreviewError::Format(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Format(err) => (StatusCode::BAD_REQUEST, "FORMAT_ERROR", err.to_string()),
            },

            // --- Import session state ---
            AppError::Session(err) => match err {
                SessionError::NothingToCommit => {
                    (StatusCode::BAD_REQUEST, "NO_VALID_ROWS", err.to_string())
                }
                _ => (StatusCode::CONFLICT, "CONFLICT", err.to_string()),
            },

            AppError::SessionNotFound(_) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string())
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "success": false,
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
