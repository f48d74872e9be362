//! Shared submission pipeline used by the CLI commands.
//!
//! Keeping this in one place avoids duplicating the wiring:
//! config -> HTTP transport -> orchestrator -> session -> submit
//!
//! The commands can then focus on presentation (text vs JSON vs export).

use crate::config::ServiceConfig;
use crate::domain::{ParameterField, Submission};
use crate::error::AppError;
use crate::inference::{InferenceOrchestrator, ReqwestTransport};

use super::session::Session;

/// A parameter value requested by the user that was clamped into range.
#[derive(Debug, Clone, PartialEq)]
pub struct ClampNotice {
    pub field: ParameterField,
    pub requested: f64,
    pub stored: f64,
}

/// Build a live session against the configured service.
pub fn connect(config: &ServiceConfig) -> Result<Session<ReqwestTransport>, AppError> {
    let transport = ReqwestTransport::new(config.timeout)?;
    let orchestrator = InferenceOrchestrator::from_config(transport, config);
    if orchestrator.catalog().is_empty() {
        log::warn!("no usable auth strategies configured; results will be synthetic");
    }
    Ok(Session::new(orchestrator, config.schema.clone()))
}

/// Apply user-supplied overrides to a session, reporting any clamping.
pub fn apply_overrides<T: crate::inference::Transport>(
    session: &mut Session<T>,
    overrides: &[(ParameterField, f64)],
) -> Vec<ClampNotice> {
    let mut notices = Vec::new();
    for &(field, requested) in overrides {
        let stored = session.set(field, requested);
        if stored != requested {
            notices.push(ClampNotice {
                field,
                requested,
                stored,
            });
        }
    }
    notices
}

/// Connect, apply overrides, submit once.
pub fn run_predict(
    config: &ServiceConfig,
    overrides: &[(ParameterField, f64)],
) -> Result<(Submission, Vec<ClampNotice>), AppError> {
    let mut session = connect(config)?;
    let notices = apply_overrides(&mut session, overrides);
    let submission = session.submit()?;
    Ok((submission, notices))
}
