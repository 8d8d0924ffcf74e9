//! Static model capability registry.
//!
//! Maps the model identifiers accepted on the OpenAI-compatible surface to
//! the descriptor the fragment service expects, plus the per-parameter
//! maxima used by the constraint engine. The registry is built once at
//! startup and shared read-only; there is no mutation path.

use std::collections::HashMap;
use std::sync::Arc;

/// Per-parameter maximum bounds declared by a model.
///
/// A maximum of zero (or `0.0`) means the parameter is not accepted for
/// this model and requests for it are silently dropped by the constraint
/// engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParamLimits {
    pub temperature_max: f64,
    pub max_tokens_max: u32,
    pub presence_penalty_max: f64,
    pub frequency_penalty_max: f64,
    pub top_p_max: f64,
    pub top_k_max: u32,
}

impl ParamLimits {
    /// Whether the model declares no bounds at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Capability descriptor for a single model.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    /// Upstream model identifier (may differ from the public alias).
    pub id: String,
    /// Provider display name, e.g. "Anthropic".
    pub provider: String,
    /// Provider identifier, e.g. "anthropic".
    pub provider_id: String,
    /// Display name, e.g. "Claude 3.5 Sonnet".
    pub name: String,
    /// Whether the model accepts non-text content upstream.
    pub multi_modal: bool,
    /// System prompt forwarded in the template descriptor (may be empty).
    pub system_prompt: String,
    /// Per-parameter maxima for the constraint engine.
    pub limits: ParamLimits,
}

/// Immutable lookup table from public model id to [`ModelSpec`].
///
/// Constructed once at startup and passed into the pipeline explicitly;
/// safe for unsynchronized concurrent reads.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Arc<HashMap<String, ModelSpec>>,
}

impl ModelRegistry {
    /// Build a registry from an explicit model table.
    #[must_use]
    pub fn new(models: HashMap<String, ModelSpec>) -> Self {
        Self {
            models: Arc::new(models),
        }
    }

    /// Look up a model by its public identifier.
    ///
    /// Absence is an error condition at the call site, not a default.
    #[must_use]
    pub fn get(&self, model_id: &str) -> Option<&ModelSpec> {
        self.models.get(model_id)
    }

    /// Public identifiers of every registered model.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }

    /// Number of registered models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Registry with the builtin model table supported by the fragment
    /// service.
    #[must_use]
    pub fn builtin() -> Self {
        let mut models = HashMap::new();

        let mut add = |alias: &str, spec: ModelSpec| {
            models.insert(alias.to_string(), spec);
        };

        // Standard bounds shared by most OpenAI-family entries
        let openai_limits = |max_tokens: u32| ParamLimits {
            temperature_max: 2.0,
            max_tokens_max: max_tokens,
            presence_penalty_max: 2.0,
            frequency_penalty_max: 2.0,
            top_p_max: 1.0,
            top_k_max: 500,
        };

        add(
            "o1-preview",
            spec("o1", "OpenAI", "openai", "o1", true, openai_limits(0)),
        );
        add(
            "o3-mini",
            spec(
                "o3-mini",
                "OpenAI",
                "openai",
                "o3 Mini",
                true,
                openai_limits(4096),
            ),
        );
        add(
            "gpt-4o",
            spec(
                "gpt-4o",
                "OpenAI",
                "openai",
                "GPT-4o",
                true,
                openai_limits(16380),
            ),
        );
        add(
            "gpt-4.5-preview",
            spec(
                "gpt-4.5-preview",
                "OpenAI",
                "openai",
                "GPT-4.5",
                true,
                openai_limits(16380),
            ),
        );
        add(
            "gpt-4-turbo",
            spec(
                "gpt-4-turbo",
                "OpenAI",
                "openai",
                "GPT-4 Turbo",
                true,
                openai_limits(16380),
            ),
        );

        let vertex_limits = ParamLimits {
            temperature_max: 2.0,
            max_tokens_max: 8192,
            presence_penalty_max: 2.0,
            frequency_penalty_max: 2.0,
            top_p_max: 1.0,
            top_k_max: 500,
        };
        let google_limits = ParamLimits {
            top_k_max: 40,
            ..vertex_limits
        };

        add(
            "gemini-1.5-pro",
            spec(
                "gemini-1.5-pro-002",
                "Google Vertex AI",
                "vertex",
                "Gemini 1.5 Pro",
                true,
                vertex_limits,
            ),
        );
        add(
            "gemini-2.5-pro-exp-03-25",
            spec(
                "gemini-2.5-pro-exp-03-25",
                "Google Generative AI",
                "google",
                "Gemini 2.5 Pro Experimental 03-25",
                true,
                google_limits,
            ),
        );
        add(
            "gemini-exp-1121",
            spec(
                "gemini-exp-1121",
                "Google Generative AI",
                "google",
                "Gemini Experimental 1121",
                true,
                google_limits,
            ),
        );
        add(
            "gemini-2.0-flash-exp",
            spec(
                "models/gemini-2.0-flash-exp",
                "Google Generative AI",
                "google",
                "Gemini 2.0 Flash",
                true,
                google_limits,
            ),
        );

        let anthropic_limits = ParamLimits {
            temperature_max: 1.0,
            max_tokens_max: 8192,
            presence_penalty_max: 2.0,
            frequency_penalty_max: 2.0,
            top_p_max: 1.0,
            top_k_max: 500,
        };

        add(
            "claude-3-5-sonnet-latest",
            spec(
                "claude-3-5-sonnet-latest",
                "Anthropic",
                "anthropic",
                "Claude 3.5 Sonnet",
                true,
                anthropic_limits,
            ),
        );
        add(
            "claude-3-7-sonnet-latest",
            spec(
                "claude-3-7-sonnet-latest",
                "Anthropic",
                "anthropic",
                "Claude 3.7 Sonnet",
                true,
                anthropic_limits,
            ),
        );
        add(
            "claude-3-5-haiku-latest",
            spec(
                "claude-3-5-haiku-latest",
                "Anthropic",
                "anthropic",
                "Claude 3.5 Haiku",
                false,
                anthropic_limits,
            ),
        );

        Self::new(models)
    }
}

fn spec(
    id: &str,
    provider: &str,
    provider_id: &str,
    name: &str,
    multi_modal: bool,
    limits: ParamLimits,
) -> ModelSpec {
    ModelSpec {
        id: id.to_string(),
        provider: provider.to_string(),
        provider_id: provider_id.to_string(),
        name: name.to_string(),
        multi_modal,
        system_prompt: String::new(),
        limits,
    }
}
