//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - initializes logging
//! - parses CLI arguments
//! - loads service configuration (env / .env, CLI overrides on top)
//! - submits the parameters and prints the report
//! - writes an optional export

use clap::Parser;

use crate::cli::{Command, PredictArgs};
use crate::config::{ENV_BASE_URL, ENV_FALLBACK_SEED, ENV_TIMEOUT_SECS, ServiceConfig};
use crate::domain::ParameterSet;
use crate::error::AppError;
use crate::inference::PayloadSchema;

pub mod pipeline;
pub mod session;

/// Entry point for the `exo` binary.
pub fn run() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // `exo` and `exo --period 3` behave like `exo predict ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Predict(args) => handle_predict(args),
        Command::Params => handle_params(),
    }
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let config = config_from_args(&args)?;
    let (submission, notices) = pipeline::run_predict(&config, &args.parameter_overrides())?;

    for n in &notices {
        eprintln!(
            "{} {} is outside [{}, {}]; using {}",
            n.field.label(),
            n.requested,
            n.field.range().0,
            n.field.range().1,
            n.stored
        );
    }

    if args.json {
        println!("{}", crate::report::format_submission_json(&submission)?);
    } else {
        println!("{}", crate::report::format_submission(&submission, args.attempts));
    }

    if let Some(path) = &args.export {
        crate::io::export::write_submission_json(path, &submission)?;
    }

    Ok(())
}

fn handle_params() -> Result<(), AppError> {
    // The wire keys may be overridden in the environment, but the table is
    // still useful without a service configured.
    let schema = match ServiceConfig::from_env() {
        Ok(config) => config.schema,
        Err(err) => {
            log::debug!("showing default wire keys: {err}");
            PayloadSchema::default()
        }
    };
    print!("{}", crate::report::format_parameters(&ParameterSet::default(), &schema));
    Ok(())
}

/// Load configuration from the environment with CLI flags taking precedence.
pub fn config_from_args(args: &PredictArgs) -> Result<ServiceConfig, AppError> {
    dotenvy::dotenv().ok();
    config_from_lookup(args, |key| std::env::var(key).ok())
}

/// Layer CLI flags over `lookup`.
pub fn config_from_lookup<F>(args: &PredictArgs, lookup: F) -> Result<ServiceConfig, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut overrides: Vec<(&str, String)> = Vec::new();
    if let Some(url) = &args.base_url {
        overrides.push((ENV_BASE_URL, url.clone()));
    }
    if let Some(secs) = args.timeout_secs {
        overrides.push((ENV_TIMEOUT_SECS, secs.to_string()));
    }
    if let Some(seed) = args.seed {
        overrides.push((ENV_FALLBACK_SEED, seed.to_string()));
    }

    ServiceConfig::from_lookup(|key| {
        overrides
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
            .or_else(|| lookup(key))
    })
}

/// Rewrite argv so `exo` defaults to `exo predict`.
///
/// Rules:
/// - `exo`                      -> `exo predict`
/// - `exo --period 3 ...`       -> `exo predict --period 3 ...`
/// - `exo --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("predict".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "predict" | "params");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "predict".to_string());
        return argv;
    }

    argv
}
