//! Axum-specific error types and mappings.
//!
//! Request-level failures surface as the OpenAI error object shape
//! (`{"error": {"message", "type", "param", "code"}}`) so existing client
//! SDKs can interpret them. Upstream failure detail is logged, never
//! echoed back verbatim.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::upstream::UpstreamError;

/// Hint appended to upstream failures. Context overruns and transient
/// upstream errors are by far the most common causes.
const UPSTREAM_HINT: &str =
    "The request failed, likely due to exceeding the context limit or a transient upstream error. Please retry later.";

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Inbound body failed to parse as a chat completion request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Model id absent from the registry.
    #[error("Unsupported model: {0}")]
    UnknownModel(String),

    /// Upstream call failed or returned nothing usable.
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// OpenAI-style error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    message: String,
    #[serde(rename = "type")]
    kind: &'static str,
    param: Option<&'static str>,
    code: Option<String>,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message, kind, param) = match self {
            Self::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                msg,
                "invalid_request_error",
                None,
            ),
            Self::UnknownModel(model) => (
                StatusCode::BAD_REQUEST,
                format!("Unsupported model: {model}"),
                "invalid_request_error",
                Some("model"),
            ),
            Self::Upstream(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{msg} {UPSTREAM_HINT}"),
                "server_error",
                None,
            ),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, "server_error", None),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                message,
                kind,
                param,
                code: None,
            },
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<UpstreamError> for HttpError {
    fn from(err: UpstreamError) -> Self {
        // Detail was already logged at the call site; keep the client copy
        // short.
        let short = match err {
            UpstreamError::Transport(_) => "Failed to reach the upstream service.",
            UpstreamError::Decode(_) => "Failed to decode the upstream response.",
            UpstreamError::EmptyResponse => "No response received from the upstream service.",
        };
        Self::Upstream(short.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_model_names_offending_param() {
        let response = HttpError::UnknownModel("nonexistent".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upstream_error_maps_to_server_error() {
        let response = HttpError::from(UpstreamError::EmptyResponse).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
