//! Drive one submission through the auth catalog.
//!
//! Strategies are tried strictly one after another. The first attempt whose
//! body normalizes wins and no further requests are sent. Every failure kind
//! (transport, HTTP status, unreadable body) is recorded and only moves the
//! loop on. When the catalog is exhausted the synthetic fallback produces the
//! result, so `submit` always returns a prediction.

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;

use crate::config::ServiceConfig;
use crate::domain::{AttemptOutcome, AttemptRecord, Prediction, RequestPayload, Submission};
use crate::inference::auth::AuthStrategy;
use crate::inference::fallback;
use crate::inference::normalize::{Normalizer, detect_shape};
use crate::inference::transport::{Transport, TransportResponse};

const CONTENT_HEADERS: [(&str, &str); 2] = [
    ("Content-Type", "application/json"),
    ("Accept", "application/json"),
];

/// Longest plain-text error body kept in an attempt record.
const MAX_DETAIL_CHARS: usize = 200;

pub struct InferenceOrchestrator<T: Transport> {
    transport: T,
    endpoint: String,
    catalog: Vec<AuthStrategy>,
    normalizer: Normalizer,
    fallback_seed: Option<u64>,
}

impl<T: Transport> InferenceOrchestrator<T> {
    pub fn new(
        transport: T,
        endpoint: impl Into<String>,
        catalog: Vec<AuthStrategy>,
        normalizer: Normalizer,
        fallback_seed: Option<u64>,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            catalog,
            normalizer,
            fallback_seed,
        }
    }

    pub fn from_config(transport: T, config: &ServiceConfig) -> Self {
        Self::new(
            transport,
            config.predict_url(),
            config.catalog(),
            Normalizer::new(config.default_model_version.clone()),
            config.fallback_seed,
        )
    }

    pub fn catalog(&self) -> &[AuthStrategy] {
        &self.catalog
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn submit(&self, payload: &RequestPayload) -> Submission {
        let mut attempts = Vec::with_capacity(self.catalog.len());

        let body = match payload.to_json_bytes() {
            Ok(body) => body,
            Err(err) => {
                log::error!("request payload could not be encoded: {err}");
                return self.fall_back(payload, attempts);
            }
        };

        let total = self.catalog.len();
        for (idx, strategy) in self.catalog.iter().enumerate() {
            log::info!("attempt {}/{total} with strategy '{}'", idx + 1, strategy.name);
            let started = Instant::now();

            let result = self
                .attempt(strategy, &body)
                .and_then(|raw| self.normalize(raw, payload));
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match result {
                Ok(prediction) => {
                    log::info!(
                        "strategy '{}' succeeded in {elapsed_ms} ms ({:?}, p={:.3})",
                        strategy.name,
                        prediction.predicted_label,
                        prediction.probability
                    );
                    attempts.push(AttemptRecord {
                        strategy: strategy.name.clone(),
                        outcome: AttemptOutcome::Success,
                        elapsed_ms,
                    });
                    return Submission { prediction, attempts };
                }
                Err(outcome) => {
                    log::warn!("strategy '{}' failed: {}", strategy.name, outcome.summary());
                    attempts.push(AttemptRecord {
                        strategy: strategy.name.clone(),
                        outcome,
                        elapsed_ms,
                    });
                }
            }
        }

        self.fall_back(payload, attempts)
    }

    /// One outbound call; `Ok` carries the parsed success body.
    fn attempt(&self, strategy: &AuthStrategy, body: &[u8]) -> Result<Value, AttemptOutcome> {
        let headers = request_headers(strategy);
        let resp = self
            .transport
            .send(&self.endpoint, &headers, body)
            .map_err(|e| AttemptOutcome::NetworkError {
                kind: e.kind,
                message: e.message,
            })?;

        if !resp.is_success() {
            return Err(AttemptOutcome::HttpError {
                status: resp.status,
                detail: error_detail(&resp),
            });
        }

        serde_json::from_slice::<Value>(&resp.body).map_err(|e| AttemptOutcome::ParseError {
            message: format!("invalid JSON body: {e}"),
        })
    }

    fn normalize(
        &self,
        raw: Value,
        payload: &RequestPayload,
    ) -> Result<Prediction, AttemptOutcome> {
        log::debug!("response shape: {:?}", detect_shape(&raw));
        self.normalizer
            .normalize(raw, payload)
            .map_err(|e| AttemptOutcome::ParseError { message: e.message })
    }

    fn fall_back(&self, payload: &RequestPayload, attempts: Vec<AttemptRecord>) -> Submission {
        log::warn!(
            "all {} auth strategies failed; returning a synthetic placeholder",
            attempts.len()
        );
        let base = self.fallback_seed.unwrap_or(fallback::DEFAULT_FALLBACK_SEED);
        let mut rng = StdRng::seed_from_u64(fallback::fallback_seed(base, payload));
        let prediction = fallback::generate(payload, &attempts, &mut rng);
        Submission { prediction, attempts }
    }
}

/// Strategy headers plus JSON content negotiation.
fn request_headers(strategy: &AuthStrategy) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = CONTENT_HEADERS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    headers.extend(strategy.headers.iter().cloned());
    headers
}

/// Best-effort human detail for a non-success response.
fn error_detail(resp: &TransportResponse) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(&resp.body) {
        for key in ["detail", "message", "error"] {
            match value.get(key) {
                Some(Value::String(s)) if !s.trim().is_empty() => return s.trim().to_string(),
                Some(Value::Null) | Some(Value::String(_)) | None => continue,
                Some(other) => return other.to_string(),
            }
        }
    }

    let text = String::from_utf8_lossy(&resp.body);
    let text = text.trim();
    if !text.is_empty() {
        return text.chars().take(MAX_DETAIL_CHARS).collect();
    }

    reqwest::StatusCode::from_u16(resp.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("no detail")
        .to_string()
}
