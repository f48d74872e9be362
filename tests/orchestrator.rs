use std::cell::RefCell;

use exo_probe::app::session::Session;
use exo_probe::domain::{
    AttemptOutcome, NetworkErrorKind, ParameterField, PredictedLabel, SourceMode,
};
use exo_probe::inference::auth::{AuthScheme, Credentials, build_catalog};
use exo_probe::inference::{
    AuthStrategy, InferenceOrchestrator, Normalizer, PayloadSchema, Transport, TransportError,
    TransportResponse,
};

/// Fake endpoint: answers by call index and records what it was sent.
struct FakeEndpoint<F> {
    respond: F,
    sent: RefCell<Vec<(String, Vec<(String, String)>, serde_json::Value)>>,
}

impl<F> FakeEndpoint<F>
where
    F: Fn(usize) -> Result<TransportResponse, TransportError>,
{
    fn new(respond: F) -> Self {
        Self {
            respond,
            sent: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.sent.borrow().len()
    }
}

impl<F> Transport for FakeEndpoint<F>
where
    F: Fn(usize) -> Result<TransportResponse, TransportError>,
{
    fn send(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &[u8],
    ) -> Result<TransportResponse, TransportError> {
        let idx = self.calls();
        let json = serde_json::from_slice(body).unwrap_or(serde_json::Value::Null);
        self.sent
            .borrow_mut()
            .push((url.to_string(), headers.to_vec(), json));
        (self.respond)(idx)
    }
}

fn catalog() -> Vec<AuthStrategy> {
    let creds = Credentials {
        bearer_token: Some("bearer-secret".to_string()),
        api_key: Some("key-secret".to_string()),
        auth_token: Some("token-secret".to_string()),
        ..Credentials::new()
    };
    build_catalog(&AuthScheme::DEFAULT_ORDER, &creds)
}

fn session<T: Transport>(transport: T, seed: Option<u64>) -> Session<T> {
    let orch = InferenceOrchestrator::new(
        transport,
        "https://classifier.test/predict",
        catalog(),
        Normalizer::default(),
        seed,
    );
    Session::new(orch, PayloadSchema::default())
}

#[test]
fn two_unauthorized_then_success_makes_exactly_three_attempts() {
    let endpoint = FakeEndpoint::new(|idx| match idx {
        0 | 1 => Ok(TransportResponse::new(401, r#"{"detail":"Not authenticated"}"#)),
        _ => Ok(TransportResponse::new(
            200,
            r#"{"prediction":"exoplanet","proba":[0.2,0.91]}"#,
        )),
    });
    let mut session = session(&endpoint, None);
    let sub = session.submit().unwrap();

    assert_eq!(endpoint.calls(), 3);
    assert_eq!(sub.attempts.len(), 3);
    assert_eq!(
        sub.attempts[0].outcome,
        AttemptOutcome::HttpError {
            status: 401,
            detail: "Not authenticated".to_string()
        }
    );
    assert_eq!(sub.attempts[2].strategy, "api-key");
    assert!(sub.attempts[2].outcome.is_success());
    assert_eq!(sub.prediction.source_mode, SourceMode::Remote);
    assert_eq!(sub.prediction.probability, 0.91);
    assert_eq!(sub.prediction.predicted_label, PredictedLabel::Positive);
    assert!(sub.prediction.note.is_none());
}

#[test]
fn network_failure_everywhere_falls_back_to_synthetic() {
    let endpoint = FakeEndpoint::new(|_| {
        Err(TransportError::new(
            NetworkErrorKind::Connect,
            "connection refused",
        ))
    });
    let mut session = session(&endpoint, None);
    let sub = session.submit().unwrap();

    assert_eq!(endpoint.calls(), catalog().len());
    assert_eq!(sub.attempts.len(), catalog().len());
    assert!(sub
        .attempts
        .iter()
        .all(|a| matches!(a.outcome, AttemptOutcome::NetworkError { .. })));
    assert_eq!(sub.prediction.source_mode, SourceMode::Synthetic);
    assert!(sub.prediction.raw_response.is_none());
    let note = sub.prediction.note.clone().unwrap_or_default();
    assert!(!note.is_empty());
    assert!(note.contains("connection refused"));
    assert!((0.0..=1.0).contains(&sub.prediction.probability));
    assert!((0.0..=1.0).contains(&sub.prediction.confidence));
}

#[test]
fn request_carries_schema_keys_and_strategy_headers() {
    let endpoint = FakeEndpoint::new(|_| Ok(TransportResponse::new(500, "")));
    let mut session = session(&endpoint, Some(3));
    session.set(ParameterField::Period, 12.0);
    session.submit().unwrap();

    let sent = endpoint.sent.borrow();
    let (url, headers, body) = &sent[0];
    assert_eq!(url, "https://classifier.test/predict");
    assert_eq!(body["period_days"], 12.0);
    assert_eq!(body["teff_k"], 5778.0);
    assert!(headers.iter().all(|(k, _)| k != "Authorization"));

    let (_, bearer_headers, _) = &sent[1];
    let bearer = ("Authorization".to_string(), "Bearer bearer-secret".to_string());
    assert!(bearer_headers.contains(&bearer));
    let (_, token_headers, _) = &sent[3];
    let token = ("X-Auth-Token".to_string(), "token-secret".to_string());
    assert!(token_headers.contains(&token));
}

#[test]
fn resubmitting_unchanged_parameters_is_repeatable() {
    let endpoint = FakeEndpoint::new(|_| {
        Ok(TransportResponse::new(
            200,
            r#"{"prediction":0,"probability":0.35,"confidence":0.8,"model_version":"v2"}"#,
        ))
    });
    let mut session = session(&endpoint, None);
    let mut first = session.submit().unwrap().prediction;
    let second = session.submit().unwrap().prediction;

    assert_eq!(first.predicted_label, PredictedLabel::Negative);
    assert_eq!(first.model_version, "v2");
    first.timestamp = second.timestamp;
    assert_eq!(first, second);
}

#[test]
fn seeded_fallback_is_repeatable_and_tracks_parameters() {
    let endpoint = FakeEndpoint::new(|_| Ok(TransportResponse::new(503, "")));
    let mut session = session(&endpoint, Some(2024));

    let mut first = session.submit().unwrap().prediction;
    let second = session.submit().unwrap().prediction;
    first.timestamp = second.timestamp;
    assert_eq!(first, second);
    assert!(first.is_synthetic());

    session.set(ParameterField::Magnitude, 16.0);
    let third = session.submit().unwrap().prediction;
    assert_eq!(third.input.get("mag"), Some(16.0));
    assert_ne!(third.input, first.input);
}

#[test]
fn unseeded_fallback_is_repeatable() {
    let endpoint = FakeEndpoint::new(|_| {
        Err(TransportError::new(
            NetworkErrorKind::Timeout,
            "operation timed out",
        ))
    });
    let mut session = session(&endpoint, None);

    let mut first = session.submit().unwrap().prediction;
    let second = session.submit().unwrap().prediction;
    assert!(first.is_synthetic());
    first.timestamp = second.timestamp;
    assert_eq!(first, second);
}

#[test]
fn malformed_success_bodies_do_not_stop_the_loop() {
    let endpoint = FakeEndpoint::new(|idx| match idx {
        0 => Ok(TransportResponse::new(200, "not json")),
        1 => Ok(TransportResponse::new(200, r#"{"detail":"ok?"}"#)),
        _ => Ok(TransportResponse::new(200, r#"{"prediction":1,"probability":1.4}"#)),
    });
    let mut session = session(&endpoint, None);
    let sub = session.submit().unwrap();

    assert_eq!(endpoint.calls(), 3);
    assert!(matches!(sub.attempts[0].outcome, AttemptOutcome::ParseError { .. }));
    assert!(matches!(sub.attempts[1].outcome, AttemptOutcome::ParseError { .. }));
    assert_eq!(sub.prediction.probability, 1.0);
    assert_eq!(sub.prediction.confidence, 1.0);
}

#[test]
fn edits_after_snapshot_only_affect_the_next_submission() {
    let endpoint = FakeEndpoint::new(|_| {
        Ok(TransportResponse::new(200, r#"{"prediction":1,"probability":0.6}"#))
    });
    let mut session = session(&endpoint, None);
    session.set(ParameterField::StarRadius, 2.0);
    let first = session.submit().unwrap();
    session.set(ParameterField::StarRadius, 0.5);
    let second = session.submit().unwrap();

    assert_eq!(first.prediction.input.get("rstar_rsun"), Some(2.0));
    assert_eq!(second.prediction.input.get("rstar_rsun"), Some(0.5));
}
