//! Domain types used throughout the submission flow.
//!
//! This module defines:
//!
//! - the adjustable transit parameters (`ParameterField`, `ParameterSet`)
//! - the wire body (`RequestPayload`)
//! - the canonical output (`Prediction`) and per-attempt diagnostics (`AttemptRecord`)

pub mod params;
pub mod types;

pub use params::*;
pub use types::*;
