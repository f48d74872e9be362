//! `exo-probe` library crate.
//!
//! The binary (`exo`) is a thin wrapper around this library so that:
//!
//! - the request pipeline is testable without spawning processes
//! - a different front end (GUI, web) can drive the same `Session`
//! - the transport can be swapped for a fake in tests

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod inference;
pub mod io;
pub mod report;
