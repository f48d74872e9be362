//! Map the service's response shapes onto one [`Prediction`].
//!
//! Two shapes have been seen in the wild:
//!
//! - label + vector: `{ "prediction": "exoplanet", "proba": [0.2, 0.91] }`
//! - binary + scalars: `{ "prediction": 0, "probability": 0.35, "confidence": 0.8, "model_version": "v2" }`
//!
//! The label always comes from the service's own `prediction` field. It is
//! never recomputed from a probability threshold, so a response such as
//! `{ "prediction": 1, "probability": 0.4 }` stays Positive.

use chrono::Utc;
use serde_json::Value;

use crate::domain::{PredictedLabel, Prediction, RequestPayload, SourceMode, clamp_unit};

/// Model version reported when the service does not send one.
pub const DEFAULT_REMOTE_MODEL_VERSION: &str = "real-api-v1.0";

/// Label strings that mean "this is a planet". Anything else is Negative.
const POSITIVE_LABELS: &[&str] = &[
    "exoplanet", "confirmed", "candidate", "planet", "positive", "true", "yes", "1",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    LabelWithVector,
    BinaryWithScalars,
}

/// A success-status body that matches neither known shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeError {
    pub message: String,
}

impl NormalizeError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for NormalizeError {}

pub fn detect_shape(raw: &Value) -> Option<ResponseShape> {
    let obj = raw.as_object()?;
    if obj.get("proba").is_some_and(Value::is_array) {
        Some(ResponseShape::LabelWithVector)
    } else if obj.get("probability").is_some_and(Value::is_number) {
        Some(ResponseShape::BinaryWithScalars)
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    default_model_version: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_REMOTE_MODEL_VERSION)
    }
}

impl Normalizer {
    pub fn new(default_model_version: impl Into<String>) -> Self {
        Self {
            default_model_version: default_model_version.into(),
        }
    }

    pub fn normalize(
        &self,
        raw: Value,
        input: &RequestPayload,
    ) -> Result<Prediction, NormalizeError> {
        let shape = detect_shape(&raw).ok_or_else(|| {
            NormalizeError::new("response has neither a 'proba' vector nor a 'probability' value")
        })?;

        let predicted_label = parse_label(raw.get("prediction"))?;

        let probability = match shape {
            ResponseShape::LabelWithVector => max_of_vector(&raw["proba"])?,
            ResponseShape::BinaryWithScalars => raw["probability"].as_f64().unwrap_or(f64::NAN),
        };
        let confidence = raw
            .get("confidence")
            .and_then(Value::as_f64)
            .unwrap_or(probability);

        let model_version = match raw.get("model_version") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => self.default_model_version.clone(),
        };

        Ok(Prediction {
            predicted_label,
            probability: clamp_unit(probability),
            confidence: clamp_unit(confidence),
            model_version,
            source_mode: SourceMode::Remote,
            raw_response: Some(raw),
            note: None,
            timestamp: Utc::now(),
            input: input.clone(),
        })
    }
}

fn parse_label(value: Option<&Value>) -> Result<PredictedLabel, NormalizeError> {
    match value {
        Some(Value::String(s)) => {
            let token = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
            if POSITIVE_LABELS.contains(&token.as_str()) {
                Ok(PredictedLabel::Positive)
            } else {
                Ok(PredictedLabel::Negative)
            }
        }
        Some(Value::Bool(true)) => Ok(PredictedLabel::Positive),
        Some(Value::Bool(false)) => Ok(PredictedLabel::Negative),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v == 1.0 => Ok(PredictedLabel::Positive),
            Some(v) if v == 0.0 => Ok(PredictedLabel::Negative),
            _ => Err(NormalizeError::new(format!("prediction {n} is not a binary class"))),
        },
        Some(other) => Err(NormalizeError::new(format!(
            "prediction has unsupported type: {other}"
        ))),
        None => Err(NormalizeError::new("response has no 'prediction' field")),
    }
}

fn max_of_vector(value: &Value) -> Result<f64, NormalizeError> {
    let items = value
        .as_array()
        .ok_or_else(|| NormalizeError::new("'proba' is not an array"))?;
    if items.is_empty() {
        return Err(NormalizeError::new("'proba' is empty"));
    }
    items.iter().try_fold(f64::NEG_INFINITY, |acc, item| {
        item.as_f64()
            .map(|v| acc.max(v))
            .ok_or_else(|| NormalizeError::new(format!("'proba' contains a non-number: {item}")))
    })
}
