//! Reporting: text and JSON renderings of a submission.

pub mod format;

pub use format::*;
