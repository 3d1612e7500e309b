//! API error types

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use anzeigen_core::CoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// An upstream-backed operation failed after all retries
    #[error("{context}: {source}")]
    Upstream {
        context: &'static str,
        #[source]
        source: CoreError,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn upstream(context: &'static str, source: CoreError) -> Self {
        Self::Upstream { context, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::Upstream { context, source } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                context.to_string(),
                source.to_string(),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                msg,
            ),
        };

        // Callers always get the envelope, even on failure
        let body = Json(json!({
            "success": false,
            "error": error,
            "details": details,
        }));

        (status, body).into_response()
    }
}
