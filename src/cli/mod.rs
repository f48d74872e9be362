//! Command-line parsing for the transit classification client.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! request pipeline. Parameter flags are optional; anything not given keeps its
//! default value.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::ParameterField;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "exo",
    version,
    about = "Ask a remote classifier whether a transit signal is an exoplanet"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit the parameters and print the classification.
    Predict(PredictArgs),
    /// List the adjustable parameters, their ranges, defaults and wire keys.
    Params,
}

#[derive(Debug, Args, Clone, Default)]
pub struct PredictArgs {
    /// Orbital period in days (0.2-1000).
    #[arg(long)]
    pub period: Option<f64>,

    /// Transit duration in hours (0.5-20).
    #[arg(long)]
    pub duration: Option<f64>,

    /// Planet radius in Earth radii (0.3-20).
    #[arg(long)]
    pub planet_radius: Option<f64>,

    /// Star radius in Solar radii (0.3-3).
    #[arg(long)]
    pub star_radius: Option<f64>,

    /// Apparent magnitude (9-17).
    #[arg(long)]
    pub magnitude: Option<f64>,

    /// Effective temperature in Kelvin (3000-8000).
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Print the full result as JSON instead of the text report.
    #[arg(long)]
    pub json: bool,

    /// Include the per-strategy attempt log in the text report.
    #[arg(long)]
    pub attempts: bool,

    /// Write the result (with attempt log) to a JSON file.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Service base URL (overrides EXO_BASE_URL).
    #[arg(long)]
    pub base_url: Option<String>,

    /// Per-attempt timeout in seconds (overrides EXO_TIMEOUT_SECS).
    #[arg(long)]
    pub timeout_secs: Option<f64>,

    /// Base seed for synthetic fallbacks (overrides EXO_FALLBACK_SEED; default 0).
    #[arg(long)]
    pub seed: Option<u64>,
}

impl PredictArgs {
    /// Parameter values given on the command line, in field order.
    pub fn parameter_overrides(&self) -> Vec<(ParameterField, f64)> {
        [
            (ParameterField::Period, self.period),
            (ParameterField::TransitDuration, self.duration),
            (ParameterField::PlanetRadius, self.planet_radius),
            (ParameterField::StarRadius, self.star_radius),
            (ParameterField::Magnitude, self.magnitude),
            (ParameterField::Temperature, self.temperature),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}
