//! Classification request pipeline.
//!
//! - payload building (`payload`)
//! - auth strategy catalog (`auth`)
//! - outbound HTTP seam (`transport`)
//! - response normalization (`normalize`)
//! - synthetic fallback (`fallback`)
//! - the attempt loop tying them together (`orchestrator`)

pub mod auth;
pub mod fallback;
pub mod normalize;
pub mod orchestrator;
pub mod payload;
pub mod transport;

pub use auth::{AuthScheme, AuthStrategy, Credentials};
pub use normalize::Normalizer;
pub use orchestrator::InferenceOrchestrator;
pub use payload::PayloadSchema;
pub use transport::{ReqwestTransport, Transport, TransportError, TransportResponse};
