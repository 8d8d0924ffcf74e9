//! Chat completion handler - the adaptation pipeline endpoint.
//!
//! POST /v1/chat/completions
//!
//! parse -> registry lookup -> parameter constraining -> message
//! normalization -> envelope assembly -> one upstream call -> immediate
//! completion object or emulated SSE stream.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use fragrelay_core::{build_request, constrain, new_id, normalize};

use crate::dto::{ChatCompletionRequest, ChatCompletionResponse};
use crate::error::HttpError;
use crate::sse::sse_response;
use crate::state::AppState;

/// Handle one chat completion request.
///
/// The body is parsed by hand so malformed input surfaces in the OpenAI
/// error shape rather than the default extractor rejection.
pub async fn completions(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, HttpError> {
    let request: ChatCompletionRequest = serde_json::from_slice(&body)
        .map_err(|e| HttpError::BadRequest(format!("Failed to parse request body: {e}")))?;

    let request_id = new_id();
    tracing::info!(
        request_id = %request_id,
        model = %request.model,
        messages = request.messages.len(),
        stream = request.stream,
        "handling chat completion request"
    );

    // Unknown model fails before any adaptation or upstream work.
    let spec = state
        .registry
        .get(&request.model)
        .ok_or_else(|| HttpError::UnknownModel(request.model.clone()))?;

    let config = constrain(&request.params, &spec.limits);
    let turns = normalize(request.messages);
    let envelope = build_request(spec, turns, config);

    tracing::info!(
        request_id = %request_id,
        session_id = %envelope.user_id,
        upstream_model = %envelope.model.name,
        turns = envelope.messages.len(),
        "sending upstream request"
    );

    let text = state.upstream.chat(&envelope).await?;

    if request.stream {
        tracing::info!(
            request_id = %request_id,
            chars = text.len(),
            "emitting emulated stream response"
        );
        Ok(sse_response(&text, &request.model, state.chunk_policy))
    } else {
        tracing::info!(
            request_id = %request_id,
            chars = text.len(),
            "returning immediate response"
        );
        Ok(Json(ChatCompletionResponse::assistant(&request.model, text)).into_response())
    }
}
