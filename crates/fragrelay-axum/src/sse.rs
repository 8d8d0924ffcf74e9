//! Emulated token-stream emission.
//!
//! The upstream answer is fully known before emission begins; this module
//! fabricates the incremental delivery clients expect from a streaming
//! chat endpoint. Chunk layout comes from the core chunk plan, pacing from
//! the injected policy. Dropping the response body (client disconnect)
//! cancels emission at the next suspend point.

use std::convert::Infallible;
use std::sync::Arc;

use axum::http::header;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::stream::Stream;

use fragrelay_core::{ChunkPolicy, chunk_plan};

use crate::dto::ChatCompletionChunk;

/// Emission state: forward-only cursor, then the sentinel, then done.
enum Phase {
    Emitting(usize),
    Terminated,
}

struct Emission {
    chunks: Vec<String>,
    model: String,
    policy: ChunkPolicy,
}

/// Build the SSE event stream for one completed answer.
///
/// Emits one `chat.completion.chunk` frame per planned chunk (fresh id
/// per frame, stop marker only on the last), then the literal `[DONE]`
/// sentinel. A serialization failure aborts the remainder without the
/// sentinel.
pub fn completion_stream(
    text: &str,
    model: &str,
    policy: ChunkPolicy,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    let emission = Arc::new(Emission {
        chunks: chunk_plan(text, &policy)
            .into_iter()
            .map(str::to_string)
            .collect(),
        model: model.to_string(),
        policy,
    });

    futures_util::stream::unfold(Phase::Emitting(0), move |phase| {
        let emission = Arc::clone(&emission);
        async move {
            match phase {
                Phase::Emitting(cursor) => {
                    // Pacing is presentation, not backpressure: sleep
                    // before every frame after the first.
                    if cursor > 0 {
                        tokio::time::sleep(emission.policy.delay).await;
                    }

                    if cursor == emission.chunks.len() {
                        return Some((
                            Ok(Event::default().data("[DONE]")),
                            Phase::Terminated,
                        ));
                    }

                    let last = cursor + 1 == emission.chunks.len();
                    let frame = ChatCompletionChunk::delta(
                        &emission.model,
                        emission.chunks[cursor].clone(),
                        last,
                    );
                    match serde_json::to_string(&frame) {
                        Ok(json) => {
                            Some((Ok(Event::default().data(json)), Phase::Emitting(cursor + 1)))
                        }
                        Err(e) => {
                            // Abort the remaining stream; the client sees
                            // a truncated stream with no sentinel.
                            tracing::error!(error = %e, cursor, "failed to serialize stream chunk");
                            None
                        }
                    }
                }
                Phase::Terminated => None,
            }
        }
    })
}

/// Wrap the event stream as an HTTP response with the standard SSE
/// headers.
pub fn sse_response(text: &str, model: &str, policy: ChunkPolicy) -> Response {
    let mut response = Sse::new(completion_stream(text, model, policy)).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, header::HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, header::HeaderValue::from_static("keep-alive"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_fixed_policy_emits_expected_frame_count() {
        let text = "x".repeat(100);
        let events: Vec<_> = completion_stream(&text, "gpt-4o", ChunkPolicy::fixed(25))
            .collect()
            .await;
        // 4 chunk frames plus the sentinel
        assert_eq!(events.len(), 5);
    }

    #[tokio::test]
    async fn test_empty_text_emits_only_sentinel() {
        let events: Vec<_> = completion_stream("", "gpt-4o", ChunkPolicy::fixed(10))
            .collect()
            .await;
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_random_policy_respects_chunk_bounds() {
        let text = "y".repeat(100);
        let policy = ChunkPolicy {
            delay: std::time::Duration::ZERO,
            ..ChunkPolicy::default()
        };
        let events: Vec<_> = completion_stream(&text, "gpt-4o", policy).collect().await;
        // ceil(100/29)=4 .. ceil(100/15)=7 chunks, plus the sentinel
        assert!((5..=8).contains(&events.len()), "got {} events", events.len());
    }
}
