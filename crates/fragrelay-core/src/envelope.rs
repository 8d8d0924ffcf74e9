//! Upstream request assembly.
//!
//! Builds the envelope the fragment service expects: a fresh session id,
//! the normalized turn sequence, the fixed template descriptor and the
//! model/config subset. Pure assembly; request-scoped and discarded after
//! the call.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::ids::new_id;
use crate::message::ChatTurn;
use crate::params::ConstrainedParams;
use crate::registry::ModelSpec;

/// Fixed instruction string carried in the template descriptor.
pub const TEMPLATE_INSTRUCTION: &str = "Chatting with users and starting role-playing, the most important thing is to pay attention to their latest messages, use only 'text' to output the chat text reply content generated for user messages, and finally output it in code";

/// Fixed logical file path the fragment service associates with the chat
/// template.
pub const TEMPLATE_FILE: &str = "pages/ChatWithUsers.txt";

/// The `text` entry of the template envelope.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateDescriptor {
    pub name: String,
    pub lib: Vec<String>,
    pub file: String,
    pub instructions: String,
    pub port: Option<u16>,
}

impl TemplateDescriptor {
    /// The fixed chat template, parameterized only by the model's declared
    /// system prompt (which may be empty).
    #[must_use]
    pub fn chat(system_prompt: &str) -> Self {
        Self {
            name: TEMPLATE_INSTRUCTION.to_string(),
            lib: vec![String::new()],
            file: TEMPLATE_FILE.to_string(),
            instructions: system_prompt.to_string(),
            port: None,
        }
    }
}

/// Template wrapper; the upstream keys the descriptor under `"text"`.
#[derive(Debug, Clone, Serialize)]
pub struct Template {
    pub text: TemplateDescriptor,
}

/// Model subset forwarded upstream.
#[derive(Debug, Clone, Serialize)]
pub struct ModelRef {
    pub id: String,
    pub provider: String,
    #[serde(rename = "providerId")]
    pub provider_id: String,
    pub name: String,
    #[serde(rename = "multiModal")]
    pub multi_modal: bool,
}

impl From<&ModelSpec> for ModelRef {
    fn from(spec: &ModelSpec) -> Self {
        Self {
            id: spec.id.clone(),
            provider: spec.provider.clone(),
            provider_id: spec.provider_id.clone(),
            name: spec.name.clone(),
            multi_modal: spec.multi_modal,
        }
    }
}

/// The complete upstream call envelope.
#[derive(Debug, Clone, Serialize)]
pub struct FragmentRequest {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub messages: Vec<ChatTurn>,
    pub template: Template,
    pub model: ModelRef,
    pub config: Value,
}

/// Assemble the upstream envelope for one inbound request.
///
/// `messages` must already be normalized. A fresh session id is generated
/// per call. When constraining produced nothing, `config` falls back to a
/// minimal object carrying only the model id. An empty turn list is valid
/// and forwarded as-is.
#[must_use]
pub fn build_request(
    spec: &ModelSpec,
    messages: Vec<ChatTurn>,
    config: Option<ConstrainedParams>,
) -> FragmentRequest {
    let config = config.map_or_else(
        || {
            let mut map = Map::new();
            map.insert("model".to_string(), Value::String(spec.id.clone()));
            Value::Object(map)
        },
        ConstrainedParams::into_value,
    );

    FragmentRequest {
        user_id: new_id(),
        messages,
        template: Template {
            text: TemplateDescriptor::chat(&spec.system_prompt),
        },
        model: ModelRef::from(spec),
        config,
    }
}
