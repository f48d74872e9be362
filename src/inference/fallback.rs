//! Placeholder predictions for when the service cannot be reached at all.
//!
//! The values are arbitrary and the result is always flagged `Synthetic` with a
//! note; randomness is supplied by the caller so tests can pin it.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::Utc;
use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::domain::{
    AttemptRecord, PredictedLabel, Prediction, RequestPayload, SourceMode, clamp_unit,
};

pub const SYNTHETIC_MODEL_VERSION: &str = "demo-v1.0";
/// Seed base used when none is configured.
pub const DEFAULT_FALLBACK_SEED: u64 = 0;

/// Build a synthetic prediction for `payload` after `attempts` all failed.
pub fn generate<R: Rng + ?Sized>(
    payload: &RequestPayload,
    attempts: &[AttemptRecord],
    rng: &mut R,
) -> Prediction {
    let probability = Uniform::new(0.2, 1.0).sample(rng);
    let confidence = Uniform::new(0.7, 1.0).sample(rng);
    let predicted_label = if rng.gen_bool(0.5) {
        PredictedLabel::Positive
    } else {
        PredictedLabel::Negative
    };

    Prediction {
        predicted_label,
        probability: clamp_unit(probability),
        confidence: clamp_unit(confidence),
        model_version: SYNTHETIC_MODEL_VERSION.to_string(),
        source_mode: SourceMode::Synthetic,
        raw_response: None,
        note: Some(fallback_note(attempts)),
        timestamp: Utc::now(),
        input: payload.clone(),
    }
}

/// Human-readable explanation of why the result is synthetic.
pub fn fallback_note(attempts: &[AttemptRecord]) -> String {
    let mut note = match attempts.len() {
        0 => "No authentication strategies are configured, \
              so the classification service was not contacted."
            .to_string(),
        1 => "The classification service could not be reached \
              with the only configured strategy."
            .to_string(),
        n => format!(
            "The classification service could not be reached \
             with any of {n} authentication strategies."
        ),
    };
    note.push_str(" This is a synthetic placeholder, not a model prediction.");
    if let Some(last) = attempts.last() {
        note.push_str(&format!(" Last failure ({}): {}", last.strategy, last.outcome.summary()));
    }
    note
}

/// Seed for a reproducible fallback: `base` mixed with the payload contents.
pub fn fallback_seed(base: u64, payload: &RequestPayload) -> u64 {
    let mut hasher = DefaultHasher::new();
    base.hash(&mut hasher);
    payload.hash(&mut hasher);
    hasher.finish()
}
