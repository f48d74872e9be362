//! Service configuration: endpoint, credentials, strategy order, timeout.
//!
//! Nothing deployment-specific is compiled in. Values come from the process
//! environment (and a `.env` file, if present), and the CLI may override a few
//! of them afterwards.

use std::time::Duration;

use crate::domain::ParameterField;
use crate::error::{AppError, EXIT_CONFIG};
use crate::inference::auth::{self, AuthScheme, AuthStrategy, Credentials};
use crate::inference::normalize::DEFAULT_REMOTE_MODEL_VERSION;
use crate::inference::payload::PayloadSchema;

pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const PREDICT_PATH: &str = "/predict";

pub const ENV_BASE_URL: &str = "EXO_BASE_URL";
pub const ENV_BEARER_TOKEN: &str = "EXO_BEARER_TOKEN";
pub const ENV_API_KEY: &str = "EXO_API_KEY";
pub const ENV_API_KEY_HEADER: &str = "EXO_API_KEY_HEADER";
pub const ENV_AUTH_TOKEN: &str = "EXO_AUTH_TOKEN";
pub const ENV_AUTH_TOKEN_HEADER: &str = "EXO_AUTH_TOKEN_HEADER";
pub const ENV_AUTH_STRATEGIES: &str = "EXO_AUTH_STRATEGIES";
pub const ENV_TIMEOUT_SECS: &str = "EXO_TIMEOUT_SECS";
pub const ENV_FALLBACK_SEED: &str = "EXO_FALLBACK_SEED";
pub const ENV_MODEL_VERSION: &str = "EXO_MODEL_VERSION";
pub const ENV_FIELD_PREFIX: &str = "EXO_FIELD_";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub credentials: Credentials,
    pub auth_order: Vec<AuthScheme>,
    /// Upper bound for each individual attempt.
    pub timeout: Duration,
    /// When set, synthetic fallbacks are reproducible per payload.
    pub fallback_seed: Option<u64>,
    /// Reported for remote responses that carry no `model_version`.
    pub default_model_version: String,
    pub schema: PayloadSchema,
}

impl ServiceConfig {
    /// Defaults for everything except the endpoint.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credentials: Credentials::new(),
            auth_order: AuthScheme::DEFAULT_ORDER.to_vec(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            fallback_seed: None,
            default_model_version: DEFAULT_REMOTE_MODEL_VERSION.to_string(),
            schema: PayloadSchema::default(),
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let base_url = get(ENV_BASE_URL).ok_or_else(|| {
            AppError::new(
                EXIT_CONFIG,
                format!("Missing {ENV_BASE_URL} in environment (.env)."),
            )
        })?;
        let mut config = Self::new(base_url);

        config.credentials.bearer_token = get(ENV_BEARER_TOKEN);
        config.credentials.api_key = get(ENV_API_KEY);
        config.credentials.auth_token = get(ENV_AUTH_TOKEN);
        if let Some(header) = get(ENV_API_KEY_HEADER) {
            config.credentials.api_key_header = header;
        }
        if let Some(header) = get(ENV_AUTH_TOKEN_HEADER) {
            config.credentials.auth_token_header = header;
        }

        if let Some(raw) = get(ENV_AUTH_STRATEGIES) {
            config.auth_order = auth::parse_order(&raw)?;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            config.timeout = parse_timeout(&raw)?;
        }
        if let Some(raw) = get(ENV_FALLBACK_SEED) {
            let seed = raw.parse::<u64>().map_err(|e| {
                AppError::new(EXIT_CONFIG, format!("Invalid {ENV_FALLBACK_SEED} '{raw}': {e}"))
            })?;
            config.fallback_seed = Some(seed);
        }
        if let Some(version) = get(ENV_MODEL_VERSION) {
            config.default_model_version = version;
        }

        for field in ParameterField::ALL {
            if let Some(key) = get(&format!("{ENV_FIELD_PREFIX}{}", field.env_token())) {
                config.schema = config.schema.with_key(field, key);
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let url = reqwest::Url::parse(&self.base_url).map_err(|e| {
            AppError::new(EXIT_CONFIG, format!("Invalid base URL '{}': {e}", self.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::new(
                EXIT_CONFIG,
                format!("Base URL must use http or https, got '{}'.", url.scheme()),
            ));
        }
        if self.timeout.is_zero() {
            return Err(AppError::new(EXIT_CONFIG, "Attempt timeout must be > 0."));
        }
        self.schema.validate()
    }

    /// Full URL of the prediction endpoint.
    pub fn predict_url(&self) -> String {
        format!("{}{PREDICT_PATH}", self.base_url.trim_end_matches('/'))
    }

    /// Ordered strategies with a usable credential.
    pub fn catalog(&self) -> Vec<AuthStrategy> {
        auth::build_catalog(&self.auth_order, &self.credentials)
    }
}

pub fn parse_timeout(raw: &str) -> Result<Duration, AppError> {
    let secs = raw.trim().parse::<f64>().map_err(|e| {
        AppError::new(EXIT_CONFIG, format!("Invalid timeout '{raw}': {e}"))
    })?;
    if !(secs.is_finite() && secs > 0.0) {
        return Err(AppError::new(
            EXIT_CONFIG,
            format!("Timeout must be > 0 seconds, got '{raw}'."),
        ));
    }
    Ok(Duration::from_secs_f64(secs))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn base_url_is_required() {
        let err = ServiceConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains(ENV_BASE_URL));
    }

    #[test]
    fn defaults_apply() {
        let config =
            ServiceConfig::from_lookup(lookup(&[(ENV_BASE_URL, "https://svc.example/")])).unwrap();
        assert_eq!(config.predict_url(), "https://svc.example/predict");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.fallback_seed, None);
        assert_eq!(config.schema, PayloadSchema::default());
        // Only the credential-free strategy survives without secrets.
        let names: Vec<String> = config.catalog().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["none"]);
    }

    #[test]
    fn full_environment() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "http://localhost:8000"),
            (ENV_API_KEY, "k"),
            (ENV_API_KEY_HEADER, "X-Key"),
            (ENV_BEARER_TOKEN, "b"),
            (ENV_AUTH_STRATEGIES, "api-key,bearer"),
            (ENV_TIMEOUT_SECS, "2.5"),
            (ENV_FALLBACK_SEED, "42"),
            (ENV_MODEL_VERSION, "svc"),
            ("EXO_FIELD_PERIOD", "period_day"),
        ]))
        .unwrap();

        let catalog = config.catalog();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].headers, vec![("X-Key".to_string(), "k".to_string())]);
        assert_eq!(catalog[1].name, "bearer");
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert_eq!(config.fallback_seed, Some(42));
        assert_eq!(config.default_model_version, "svc");
        assert_eq!(config.schema.key(ParameterField::Period), "period_day");
    }

    #[test]
    fn invalid_values_are_config_errors() {
        for pairs in [
            vec![(ENV_BASE_URL, "not a url")],
            vec![(ENV_BASE_URL, "ftp://svc.example")],
            vec![(ENV_BASE_URL, "https://svc.example"), (ENV_TIMEOUT_SECS, "0")],
            vec![(ENV_BASE_URL, "https://svc.example"), (ENV_FALLBACK_SEED, "-1")],
            vec![(ENV_BASE_URL, "https://svc.example"), (ENV_AUTH_STRATEGIES, "magic")],
            vec![(ENV_BASE_URL, "https://svc.example"), ("EXO_FIELD_MAGNITUDE", "teff_k")],
        ] {
            let err = ServiceConfig::from_lookup(lookup(&pairs)).unwrap_err();
            assert_eq!(err.exit_code(), 2, "{pairs:?}");
        }
    }
}
