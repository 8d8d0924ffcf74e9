//! Conversation normalization.
//!
//! Client requests arrive with heterogeneous content shapes (plain strings,
//! typed block arrays, loose objects) and arbitrary role sequences. The
//! fragment service only accepts alternating user/assistant turns whose
//! content is a single-element text block array. This module performs that
//! collapse as a pure `Vec`-in/`Vec`-out transformation that never fails:
//! anything unusable degrades to omission.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a conversation turn.
///
/// Unknown roles are preserved verbatim so they can pass through the
/// normalizer untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    System,
    User,
    Assistant,
    Other(String),
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "system" => Self::System,
            "user" => Self::User,
            "assistant" => Self::Assistant,
            _ => Self::Other(s),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

/// One typed content block inside a block-array content value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Non-text block payloads (image urls etc.) ride along untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ContentPart {
    /// A plain text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(text.into()),
            extra: serde_json::Map::new(),
        }
    }
}

/// The three content shapes clients send, as a tagged variant instead of
/// runtime type inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain string content.
    Text(String),
    /// Ordered sequence of typed blocks.
    Parts(Vec<ContentPart>),
    /// Anything else; usable only if it is an object with a `text` field.
    Other(Value),
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: MessageContent,
}

/// Extract the plain-text payload of a content value.
///
/// Strings are used as-is; block arrays concatenate the text of every
/// `"text"` block joined by newline, ignoring other block kinds; a loose
/// object contributes its `text` field if that is a string. Any other
/// shape yields the empty string.
#[must_use]
pub fn extract_text(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(s) => s.clone(),
        MessageContent::Parts(parts) => parts
            .iter()
            .filter(|p| p.kind == "text")
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n"),
        MessageContent::Other(value) => value
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_default(),
    }
}

/// Normalize a conversation into the fragment service's turn shape.
///
/// - Turns whose extracted text is empty are dropped entirely.
/// - `system` turns become `user` turns (upstream has no system concept).
/// - Consecutive turns that end up with the same role are merged, their
///   text joined by newline, so the output never contains two adjacent
///   same-role turns.
/// - `user`/`assistant` content is re-wrapped as a single text block;
///   unknown roles keep their original content shape unless a merge forced
///   them to plain text.
///
/// Never fails. An all-empty input produces an empty output, which callers
/// must treat as a valid (if useless) conversation.
#[must_use]
pub fn normalize(turns: Vec<ChatTurn>) -> Vec<ChatTurn> {
    let total = turns.len();
    let mut merged: Vec<ChatTurn> = Vec::with_capacity(total);

    for turn in turns {
        let text = extract_text(&turn.content);
        if text.is_empty() {
            continue;
        }

        // Re-map before merging so a system turn followed by a user turn
        // collapses into one user turn instead of two.
        let role = match turn.role {
            Role::System => Role::User,
            other => other,
        };

        if let Some(last) = merged.last_mut() {
            if last.role == role {
                let last_text = extract_text(&last.content);
                if !last_text.is_empty() {
                    last.content = MessageContent::Text(format!("{last_text}\n{text}"));
                    continue;
                }
            }
        }

        merged.push(ChatTurn {
            role,
            content: turn.content,
        });
    }

    if merged.len() < total {
        tracing::debug!(
            dropped = total - merged.len(),
            retained = merged.len(),
            "dropped or merged conversation turns during normalization"
        );
    }

    merged
        .into_iter()
        .map(|turn| match turn.role {
            Role::User | Role::Assistant => {
                let text = extract_text(&turn.content);
                ChatTurn {
                    role: turn.role,
                    content: MessageContent::Parts(vec![ContentPart::text(text)]),
                }
            }
            // Unknown roles pass through with their content shape intact.
            _ => turn,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn text_turn(role: &str, text: &str) -> ChatTurn {
        ChatTurn {
            role: Role::from(role.to_string()),
            content: MessageContent::Text(text.to_string()),
        }
    }

    #[test]
    fn test_extract_plain_string() {
        let content = MessageContent::Text("hello".to_string());
        assert_eq!(extract_text(&content), "hello");
    }

    #[test]
    fn test_extract_joins_text_blocks_ignoring_others() {
        let content: MessageContent = serde_json::from_value(serde_json::json!([
            {"type": "text", "text": "first"},
            {"type": "image_url", "image_url": {"url": "http://x/y.png"}},
            {"type": "text", "text": "second"},
        ]))
        .unwrap();
        assert_eq!(extract_text(&content), "first\nsecond");
    }

    #[test]
    fn test_extract_object_text_field() {
        let content: MessageContent =
            serde_json::from_value(serde_json::json!({"text": "from object"})).unwrap();
        assert_eq!(extract_text(&content), "from object");
    }

    #[test]
    fn test_extract_unusable_shape_is_empty() {
        let content: MessageContent =
            serde_json::from_value(serde_json::json!({"foo": 42})).unwrap();
        assert_eq!(extract_text(&content), "");
    }

    #[test]
    fn test_extraction_idempotent_across_equivalent_shapes() {
        let plain = MessageContent::Text("same words".to_string());
        let block: MessageContent =
            serde_json::from_value(serde_json::json!([{"type": "text", "text": "same words"}]))
                .unwrap();
        assert_eq!(extract_text(&plain), extract_text(&block));
    }

    #[test]
    fn test_single_turn_round_trip() {
        let out = normalize(vec![text_turn("user", "just this")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].role, Role::User);
        assert_eq!(
            out[0].content,
            MessageContent::Parts(vec![ContentPart::text("just this")])
        );
    }

    #[test]
    fn test_empty_turns_are_dropped() {
        let out = normalize(vec![
            text_turn("user", ""),
            text_turn("assistant", "kept"),
            text_turn("user", ""),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(extract_text(&out[0].content), "kept");
    }

    #[test]
    fn test_all_empty_input_yields_empty_output() {
        let out = normalize(vec![text_turn("user", ""), text_turn("system", "")]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_adjacent_same_role_turns_merge() {
        let out = normalize(vec![
            text_turn("user", "one"),
            text_turn("user", "two"),
            text_turn("assistant", "reply"),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(extract_text(&out[0].content), "one\ntwo");
        assert_eq!(out[1].role, Role::Assistant);
    }

    #[test]
    fn test_system_merges_into_following_user() {
        let out = normalize(vec![
            text_turn("system", "be brief"),
            text_turn("user", "hi"),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].role, Role::User);
        assert_eq!(extract_text(&out[0].content), "be brief\nhi");
    }

    #[test]
    fn test_unknown_role_passes_through_with_shape() {
        let content: MessageContent =
            serde_json::from_value(serde_json::json!({"text": "tool output", "tag": 7})).unwrap();
        let out = normalize(vec![ChatTurn {
            role: Role::from("tool".to_string()),
            content: content.clone(),
        }]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].role, Role::Other("tool".to_string()));
        assert_eq!(out[0].content, content);
    }

    #[test]
    fn test_empty_turn_breaks_no_role_continuity() {
        // An elided turn must not shield two same-role neighbours from
        // merging.
        let out = normalize(vec![
            text_turn("user", "a"),
            text_turn("assistant", ""),
            text_turn("user", "b"),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(extract_text(&out[0].content), "a\nb");
    }

    #[test]
    fn test_alternation_invariant_on_random_sequences() {
        let roles = ["system", "user", "assistant", "tool"];
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..200 {
            let len = rng.gen_range(0..12);
            let turns: Vec<ChatTurn> = (0..len)
                .map(|i| {
                    let role = roles[rng.gen_range(0..roles.len())];
                    let text = if rng.gen_bool(0.2) {
                        String::new()
                    } else {
                        format!("m{i}")
                    };
                    text_turn(role, &text)
                })
                .collect();

            let out = normalize(turns);
            for pair in out.windows(2) {
                assert_ne!(
                    pair[0].role, pair[1].role,
                    "normalized output contained adjacent same-role turns"
                );
            }
        }
    }

    #[test]
    fn test_wrapped_shape_is_single_text_block() {
        let out = normalize(vec![text_turn("assistant", "answer")]);
        let json = serde_json::to_value(&out[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "role": "assistant",
                "content": [{"type": "text", "text": "answer"}],
            })
        );
    }
}
