//! Bearer credential middleware.
//!
//! Requests to `/v1/*` must carry `Authorization: Bearer {key}` matching
//! the configured secret. The comparison uses the pre-built full header
//! value, so no per-request allocation. Rejection happens before any
//! adaptation work.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Validate the bearer credential.
///
/// `expected` holds the full `"Bearer <key>"` string. On mismatch returns
/// 401 with a `WWW-Authenticate: Bearer` header and the error body shape
/// clients of this surface expect.
pub async fn validate_bearer(expected: Arc<str>, req: Request, next: Next) -> Response {
    let auth = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth {
        Some(h) if h == expected.as_ref() => next.run(req).await,
        provided => {
            tracing::warn!(
                path = %req.uri().path(),
                token_prefix = provided.map(mask).unwrap_or_default(),
                "unauthorized request - missing or invalid credential"
            );
            let mut response =
                (StatusCode::UNAUTHORIZED, axum::Json(json!({"error": "Unauthorized"})))
                    .into_response();
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Bearer"),
            );
            response
        }
    }
}

/// Shorten a credential for log output.
fn mask(value: &str) -> String {
    let shown: String = value.chars().take(12).collect();
    if shown.len() < value.len() {
        format!("{shown}...")
    } else {
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_truncates_long_values() {
        assert_eq!(mask("Bearer sk-1234567890"), "Bearer sk-12...");
        assert_eq!(mask("short"), "short");
    }
}
