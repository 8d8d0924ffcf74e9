//! Generation parameter constraint engine.
//!
//! Clamps client-requested sampling parameters against the maxima a model
//! declares in the registry. Values are only ever clamped downward;
//! parameters the model does not bound (or the client did not send) are
//! omitted rather than defaulted.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::registry::ParamLimits;

/// Optional generation parameters as received on the OpenAI-compatible
/// surface.
///
/// Each field deserializes leniently: a value of the wrong JSON kind reads
/// as absent instead of failing the whole request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationParams {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub max_tokens: Option<u32>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub presence_penalty: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub frequency_penalty: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub top_p: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub top_k: Option<u32>,
}

/// Parameters that survived constraining, ready for the upstream `config`
/// field. Absent fields are omitted from serialization entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConstrainedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

impl ConstrainedParams {
    /// Whether no parameter survived constraining.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Serialize to the upstream `config` object, omitting absent fields.
    #[must_use]
    pub fn into_value(self) -> Value {
        let mut map = serde_json::Map::new();
        if let Some(v) = self.temperature {
            map.insert("temperature".to_string(), v.into());
        }
        if let Some(v) = self.max_tokens {
            map.insert("max_tokens".to_string(), v.into());
        }
        if let Some(v) = self.presence_penalty {
            map.insert("presence_penalty".to_string(), v.into());
        }
        if let Some(v) = self.frequency_penalty {
            map.insert("frequency_penalty".to_string(), v.into());
        }
        if let Some(v) = self.top_p {
            map.insert("top_p".to_string(), v.into());
        }
        if let Some(v) = self.top_k {
            map.insert("top_k".to_string(), v.into());
        }
        Value::Object(map)
    }
}

/// Clamp requested parameters against a model's declared maxima.
///
/// Pure function. Returns `None` when the model declares no bounds at all
/// (the caller then falls back to a minimal model-only config). A bound of
/// zero means the parameter is not accepted and the requested value is
/// dropped. Accepted values become `min(requested, max)`.
#[must_use]
pub fn constrain(params: &GenerationParams, limits: &ParamLimits) -> Option<ConstrainedParams> {
    if limits.is_empty() {
        return None;
    }

    Some(ConstrainedParams {
        temperature: clamp_f64(params.temperature, limits.temperature_max),
        max_tokens: clamp_u32(params.max_tokens, limits.max_tokens_max),
        presence_penalty: clamp_f64(params.presence_penalty, limits.presence_penalty_max),
        frequency_penalty: clamp_f64(params.frequency_penalty, limits.frequency_penalty_max),
        top_p: clamp_f64(params.top_p, limits.top_p_max),
        top_k: clamp_u32(params.top_k, limits.top_k_max),
    })
}

fn clamp_f64(requested: Option<f64>, max: f64) -> Option<f64> {
    if max > 0.0 {
        requested.map(|v| v.min(max))
    } else {
        None
    }
}

fn clamp_u32(requested: Option<u32>, max: u32) -> Option<u32> {
    if max > 0 {
        requested.map(|v| v.min(max))
    } else {
        None
    }
}

/// Deserialize a number as `Some(f64)`, anything else as `None`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

/// Deserialize a non-negative integer as `Some(u32)`, anything else as
/// `None`.
fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_u64().and_then(|n| u32::try_from(n).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> ParamLimits {
        ParamLimits {
            temperature_max: 2.0,
            max_tokens_max: 4096,
            presence_penalty_max: 2.0,
            frequency_penalty_max: 2.0,
            top_p_max: 1.0,
            top_k_max: 500,
        }
    }

    #[test]
    fn test_values_are_clamped_to_model_max() {
        let params = GenerationParams {
            temperature: Some(3.5),
            max_tokens: Some(100_000),
            top_p: Some(0.9),
            ..Default::default()
        };
        let constrained = constrain(&params, &limits()).unwrap();
        assert_eq!(constrained.temperature, Some(2.0));
        assert_eq!(constrained.max_tokens, Some(4096));
        assert_eq!(constrained.top_p, Some(0.9));
    }

    #[test]
    fn test_values_are_never_raised() {
        let params = GenerationParams {
            temperature: Some(0.2),
            ..Default::default()
        };
        let constrained = constrain(&params, &limits()).unwrap();
        assert_eq!(constrained.temperature, Some(0.2));
    }

    #[test]
    fn test_absent_params_stay_absent() {
        let constrained = constrain(&GenerationParams::default(), &limits()).unwrap();
        assert!(constrained.is_empty());
        let json = serde_json::to_value(&constrained).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn test_zero_bound_drops_parameter() {
        let params = GenerationParams {
            max_tokens: Some(2048),
            temperature: Some(1.0),
            ..Default::default()
        };
        let bounded = ParamLimits {
            max_tokens_max: 0,
            ..limits()
        };
        let constrained = constrain(&params, &bounded).unwrap();
        assert_eq!(constrained.max_tokens, None);
        assert_eq!(constrained.temperature, Some(1.0));
    }

    #[test]
    fn test_empty_limits_yield_no_config() {
        let params = GenerationParams {
            temperature: Some(1.0),
            ..Default::default()
        };
        assert!(constrain(&params, &ParamLimits::default()).is_none());
    }

    #[test]
    fn test_wrong_kind_value_reads_as_absent() {
        let params: GenerationParams = serde_json::from_value(serde_json::json!({
            "temperature": "hot",
            "max_tokens": 1024,
            "top_k": -5,
        }))
        .unwrap();
        assert_eq!(params.temperature, None);
        assert_eq!(params.max_tokens, Some(1024));
        assert_eq!(params.top_k, None);
    }

    #[test]
    fn test_clamped_output_le_request_and_max() {
        // Property over a sweep of requested values
        for requested in [0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 10.0] {
            let params = GenerationParams {
                temperature: Some(requested),
                ..Default::default()
            };
            let out = constrain(&params, &limits()).unwrap().temperature.unwrap();
            assert!(out <= requested);
            assert!(out <= limits().temperature_max);
        }
    }
}
