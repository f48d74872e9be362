//! Shared domain types for one classification submission.
//!
//! These are kept serializable so a finished submission can be printed as JSON
//! or exported to a file without a separate DTO layer.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{AppError, EXIT_IO};

/// Flat wire body: key -> value, in schema order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestPayload {
    entries: Vec<(String, f64)>,
}

impl RequestPayload {
    pub(crate) fn from_entries(entries: Vec<(String, f64)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode as a JSON object body.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, AppError> {
        serde_json::to_vec(self)
            .map_err(|e| AppError::new(EXIT_IO, format!("Failed to encode request payload: {e}")))
    }
}

impl Serialize for RequestPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// f64 has no Hash; hash the bit pattern so identical payloads hash identically.
impl Hash for RequestPayload {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for (key, value) in &self.entries {
            key.hash(state);
            value.to_bits().hash(state);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictedLabel {
    Positive,
    Negative,
}

impl PredictedLabel {
    pub fn display_name(self) -> &'static str {
        match self {
            PredictedLabel::Positive => "Exoplanet detected",
            PredictedLabel::Negative => "No exoplanet detected",
        }
    }
}

/// Where a prediction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    Remote,
    Synthetic,
}

/// Canonical classification result; exactly one per submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub predicted_label: PredictedLabel,
    /// Always within `[0, 1]`.
    pub probability: f64,
    /// Always within `[0, 1]`.
    pub confidence: f64,
    pub model_version: String,
    pub source_mode: SourceMode,
    /// Parsed remote body; `None` for synthetic results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<serde_json::Value>,
    /// Always set, and non-empty, for synthetic results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// The body that was submitted.
    pub input: RequestPayload,
}

impl Prediction {
    pub fn is_synthetic(&self) -> bool {
        self.source_mode == SourceMode::Synthetic
    }

    /// The label string the remote service itself returned, if any.
    pub fn remote_label(&self) -> Option<String> {
        let value = self.raw_response.as_ref()?.get("prediction")?;
        match value {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// Clamp into `[0, 1]`; NaN maps to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkErrorKind {
    Timeout,
    Connect,
    Other,
}

/// Result of a single attempt against the remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    HttpError { status: u16, detail: String },
    NetworkError { kind: NetworkErrorKind, message: String },
    ParseError { message: String },
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success)
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        match self {
            AttemptOutcome::Success => "ok".to_string(),
            AttemptOutcome::HttpError { status, detail } => format!("HTTP {status}: {detail}"),
            AttemptOutcome::NetworkError { kind, message } => {
                let kind = match kind {
                    NetworkErrorKind::Timeout => "timeout",
                    NetworkErrorKind::Connect => "connection failed",
                    NetworkErrorKind::Other => "network error",
                };
                format!("{kind}: {message}")
            }
            AttemptOutcome::ParseError { message } => format!("unreadable response: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    pub strategy: String,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
    pub elapsed_ms: u64,
}

/// A finished submission: its prediction and the attempts that led to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub prediction: Prediction,
    pub attempts: Vec<AttemptRecord>,
}
