//! Fragment service client.
//!
//! One synchronous request/response exchange per inbound chat request.
//! The upstream has no native streaming and no retry semantics here: the
//! POST triggers generation, so a blind retry would double-spend.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, REFERER};
use serde::Deserialize;
use thiserror::Error;

use fragrelay_core::FragmentRequest;

/// Errors from the single upstream exchange.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("upstream response decode error: {0}")]
    Decode(#[source] reqwest::Error),

    /// Both `code` and `text` were empty after trimming.
    #[error("upstream returned no usable text")]
    EmptyResponse,
}

/// Raw upstream reply; either field may carry the answer.
#[derive(Debug, Deserialize)]
struct FragmentResponse {
    #[serde(default)]
    code: String,
    #[serde(default)]
    text: String,
}

impl FragmentResponse {
    /// First non-empty of trimmed `code` then trimmed `text`.
    fn into_text(self) -> Option<String> {
        let code = self.code.trim();
        if !code.is_empty() {
            return Some(code.to_string());
        }
        let text = self.text.trim();
        if !text.is_empty() {
            return Some(text.to_string());
        }
        None
    }
}

/// HTTP client for the fragment service.
///
/// Carries the fixed browser-shaped header set the upstream expects on
/// every call. The base url is configurable so tests can point at a stub.
#[derive(Debug, Clone)]
pub struct FragmentClient {
    http: reqwest::Client,
    headers: HeaderMap,
    base_url: String,
}

impl FragmentClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            headers: default_headers(),
            base_url: base_url.into(),
        }
    }

    /// Send one chat envelope and extract the completed answer.
    ///
    /// Detail of any failure is logged here with the session id; callers
    /// surface only a generic message to the client.
    pub async fn chat(&self, request: &FragmentRequest) -> Result<String, UpstreamError> {
        let url = format!("{}/api/chat", self.base_url);
        let started = std::time::Instant::now();

        let response = self
            .http
            .post(&url)
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(session_id = %request.user_id, error = %e, "upstream request failed");
                UpstreamError::Transport(e)
            })?;

        let status = response.status();
        let body: FragmentResponse = response.json().await.map_err(|e| {
            tracing::error!(session_id = %request.user_id, error = %e, "upstream response not decodable");
            UpstreamError::Decode(e)
        })?;

        tracing::info!(
            session_id = %request.user_id,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            has_code = !body.code.is_empty(),
            has_text = !body.text.is_empty(),
            "received upstream response"
        );

        body.into_text().ok_or_else(|| {
            tracing::error!(session_id = %request.user_id, "upstream returned no usable text");
            UpstreamError::EmptyResponse
        })
    }
}

/// The fixed header set the fragment service expects.
fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    let pairs: [(&str, &str); 10] = [
        ("accept", "*/*"),
        ("accept-language", "zh-CN,zh;q=0.9"),
        ("priority", "u=1, i"),
        (
            "sec-ch-ua",
            "\"Microsoft Edge\";v=\"131\", \"Chromium\";v=\"131\", \"Not_A Brand\";v=\"24\"",
        ),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", "\"Windows\""),
        ("sec-fetch-dest", "empty"),
        ("sec-fetch-mode", "cors"),
        ("sec-fetch-site", "same-origin"),
        ("referrer-policy", "strict-origin-when-cross-origin"),
    ];
    for (name, value) in pairs {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }
    if let Ok(value) = HeaderValue::from_str("https://fragments.e2b.dev/") {
        headers.insert(REFERER, value);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_preferred_over_text() {
        let body = FragmentResponse {
            code: "  print('hi')  ".to_string(),
            text: "prose".to_string(),
        };
        assert_eq!(body.into_text().as_deref(), Some("print('hi')"));
    }

    #[test]
    fn test_text_used_when_code_blank() {
        let body = FragmentResponse {
            code: "   ".to_string(),
            text: " hello ".to_string(),
        };
        assert_eq!(body.into_text().as_deref(), Some("hello"));
    }

    #[test]
    fn test_both_blank_is_none() {
        let body = FragmentResponse {
            code: String::new(),
            text: "  ".to_string(),
        };
        assert!(body.into_text().is_none());
    }

    #[test]
    fn test_default_headers_include_browser_set() {
        let headers = default_headers();
        assert_eq!(headers.get("sec-fetch-mode").unwrap(), "cors");
        assert!(headers.contains_key(REFERER));
    }
}
