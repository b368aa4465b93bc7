//! HTTPエラー型と上流エラーからの変換

use assistant_core::services::RunError;
use assistant_core::AiError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::models::ErrorResponse;

#[derive(Debug, Error)]
pub enum HttpError {
    /// Service unavailable (e.g. assistant not configured).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error (upstream AI failures land here).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            HttpError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        let body = ErrorResponse { error: message, status: status.as_u16() };
        (status, Json(body)).into_response()
    }
}

impl From<AiError> for HttpError {
    fn from(err: AiError) -> Self {
        tracing::error!(target: "assistant_web", error = %err, "upstream AI call failed");
        HttpError::Internal(err.to_string())
    }
}

impl From<RunError> for HttpError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::AssistantNotConfigured => {
                HttpError::ServiceUnavailable(RunError::AssistantNotConfigured.to_string())
            }
            RunError::Upstream(e) => e.into(),
        }
    }
}
