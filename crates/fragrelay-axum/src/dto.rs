//! Request/response DTOs for the OpenAI-compatible surface.

use serde::{Deserialize, Serialize};

use fragrelay_core::{ChatTurn, GenerationParams, new_id};

/// Inbound chat completion request body.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
    /// Whether to emulate a token stream.
    #[serde(default)]
    pub stream: bool,
    /// Optional generation parameters; mistyped values read as absent.
    #[serde(flatten)]
    pub params: GenerationParams,
}

/// Assistant message inside a completion choice.
#[derive(Debug, Serialize)]
pub struct AssistantMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatChoice {
    pub index: u32,
    pub message: AssistantMessage,
    pub finish_reason: &'static str,
}

/// Immediate-mode completion object.
#[derive(Debug, Serialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChatChoice>,
    pub usage: Option<serde_json::Value>,
}

impl ChatCompletionResponse {
    /// Wrap a completed upstream answer as one `chat.completion` object.
    #[must_use]
    pub fn assistant(model: &str, content: String) -> Self {
        Self {
            id: new_id(),
            object: "chat.completion",
            created: chrono::Utc::now().timestamp(),
            model: model.to_string(),
            choices: vec![ChatChoice {
                index: 0,
                message: AssistantMessage {
                    role: "assistant",
                    content,
                },
                finish_reason: "stop",
            }],
            usage: None,
        }
    }
}

/// One emulated-stream frame payload.
#[derive(Debug, Serialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Serialize)]
pub struct ChunkChoice {
    pub index: u32,
    pub delta: ChunkDelta,
    pub finish_reason: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ChunkDelta {
    pub content: String,
}

impl ChatCompletionChunk {
    /// A delta frame carrying one chunk of text; `last` marks the stop
    /// frame.
    #[must_use]
    pub fn delta(model: &str, content: String, last: bool) -> Self {
        Self {
            id: new_id(),
            object: "chat.completion.chunk",
            created: chrono::Utc::now().timestamp(),
            model: model.to_string(),
            choices: vec![ChunkChoice {
                index: 0,
                delta: ChunkDelta { content },
                finish_reason: last.then_some("stop"),
            }],
        }
    }
}

/// `/v1/models` listing.
#[derive(Debug, Serialize)]
pub struct ModelList {
    pub object: &'static str,
    pub data: Vec<ModelEntry>,
}

#[derive(Debug, Serialize)]
pub struct ModelEntry {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub owned_by: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_wire_shape() {
        let response = ChatCompletionResponse::assistant("gpt-4o", "hello".to_string());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["object"], "chat.completion");
        assert_eq!(json["choices"][0]["index"], 0);
        assert_eq!(json["choices"][0]["message"]["role"], "assistant");
        assert_eq!(json["choices"][0]["message"]["content"], "hello");
        assert_eq!(json["choices"][0]["finish_reason"], "stop");
        assert_eq!(json["usage"], serde_json::Value::Null);
    }

    #[test]
    fn test_chunk_stop_marker_only_when_last() {
        let mid = ChatCompletionChunk::delta("gpt-4o", "par".to_string(), false);
        let end = ChatCompletionChunk::delta("gpt-4o", "t".to_string(), true);
        let mid = serde_json::to_value(&mid).unwrap();
        let end = serde_json::to_value(&end).unwrap();
        assert_eq!(mid["choices"][0]["finish_reason"], serde_json::Value::Null);
        assert_eq!(end["choices"][0]["finish_reason"], "stop");
        assert_eq!(mid["object"], "chat.completion.chunk");
    }

    #[test]
    fn test_request_accepts_flattened_params() {
        let request: ChatCompletionRequest = serde_json::from_value(serde_json::json!({
            "model": "gpt-4o",
            "messages": [{"role": "user", "content": "hi"}],
            "stream": true,
            "temperature": 0.9,
        }))
        .unwrap();
        assert!(request.stream);
        assert_eq!(request.params.temperature, Some(0.9));
        assert_eq!(request.messages.len(), 1);
    }
}
