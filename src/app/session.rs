//! One user session: the live parameter set and the orchestrator behind it.
//!
//! `submit` takes `&mut self`, so a second submission cannot start while one
//! is in flight. The request is built from a snapshot; edits made afterwards
//! only affect the next submission.

use crate::domain::{ParameterField, ParameterSet, Submission};
use crate::error::AppError;
use crate::inference::payload::{self, PayloadSchema};
use crate::inference::{InferenceOrchestrator, Transport};

pub struct Session<T: Transport> {
    params: ParameterSet,
    schema: PayloadSchema,
    orchestrator: InferenceOrchestrator<T>,
}

impl<T: Transport> Session<T> {
    pub fn new(orchestrator: InferenceOrchestrator<T>, schema: PayloadSchema) -> Self {
        Self {
            params: ParameterSet::default(),
            schema,
            orchestrator,
        }
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn get(&self, field: ParameterField) -> f64 {
        self.params.get(field)
    }

    /// Clamp and store; returns the stored value.
    pub fn set(&mut self, field: ParameterField, value: f64) -> f64 {
        self.params.set(field, value)
    }

    pub fn orchestrator(&self) -> &InferenceOrchestrator<T> {
        &self.orchestrator
    }

    /// Submit the current parameters.
    ///
    /// Errors only when the payload contract is broken; remote failures of any
    /// kind still yield `Ok` with a synthetic prediction.
    pub fn submit(&mut self) -> Result<Submission, AppError> {
        let snapshot = self.params.snapshot();
        let payload = payload::build(&self.schema, &snapshot)?;
        Ok(self.orchestrator.submit(&payload))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::domain::{NetworkErrorKind, SourceMode};
    use crate::inference::{Normalizer, TransportError, TransportResponse};
    use crate::inference::auth::{AuthScheme, Credentials, build_catalog};

    /// Echoes the submitted period back as the probability (scaled to [0, 1]).
    struct EchoPeriod {
        calls: Cell<usize>,
    }

    impl Transport for EchoPeriod {
        fn send(
            &self,
            _url: &str,
            _headers: &[(String, String)],
            body: &[u8],
        ) -> Result<TransportResponse, TransportError> {
            self.calls.set(self.calls.get() + 1);
            let sent: serde_json::Value = serde_json::from_slice(body)
                .map_err(|e| TransportError::new(NetworkErrorKind::Other, e.to_string()))?;
            let period = sent["period_days"].as_f64().unwrap_or(0.0);
            let reply = serde_json::json!({ "prediction": 1, "probability": period / 1000.0 });
            Ok(TransportResponse::new(200, reply.to_string()))
        }
    }

    fn session() -> Session<EchoPeriod> {
        let orch = InferenceOrchestrator::new(
            EchoPeriod { calls: Cell::new(0) },
            "http://localhost/predict",
            build_catalog(&[AuthScheme::None], &Credentials::new()),
            Normalizer::default(),
            None,
        );
        Session::new(orch, PayloadSchema::default())
    }

    #[test]
    fn submit_uses_current_parameters() {
        let mut session = session();
        session.set(ParameterField::Period, 500.0);
        let sub = session.submit().unwrap();
        assert_eq!(sub.prediction.source_mode, SourceMode::Remote);
        assert_eq!(sub.prediction.probability, 0.5);
        assert_eq!(sub.prediction.input.get("period_days"), Some(500.0));

        session.set(ParameterField::Period, 250.0);
        let sub = session.submit().unwrap();
        assert_eq!(sub.prediction.probability, 0.25);
        assert_eq!(session.orchestrator().catalog().len(), 1);
    }

    #[test]
    fn set_is_clamped_through_the_session() {
        let mut session = session();
        assert_eq!(session.set(ParameterField::Temperature, 100.0), 3000.0);
        assert_eq!(session.get(ParameterField::Temperature), 3000.0);
    }

    #[test]
    fn broken_schema_surfaces_as_error() {
        let orch = InferenceOrchestrator::new(
            EchoPeriod { calls: Cell::new(0) },
            "http://localhost/predict",
            Vec::new(),
            Normalizer::default(),
            None,
        );
        let schema = PayloadSchema::default().with_key(ParameterField::Magnitude, "");
        let mut session = Session::new(orch, schema);
        assert!(session.submit().is_err());
        assert_eq!(session.orchestrator().catalog().len(), 0);
    }
}
