//! Credential schemes tried against the classification service, in order.
//!
//! The catalog is built once from configuration and never changes per request.
//! Earlier entries are tried first; the orchestrator stops at the first success.

use std::str::FromStr;

use crate::error::{AppError, EXIT_CONFIG};

pub const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";
pub const DEFAULT_AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthScheme {
    /// No credential headers.
    None,
    /// `Authorization: Bearer <token>`.
    Bearer,
    /// Static API key in a custom header.
    ApiKey,
    /// Auth token in a custom header.
    AuthToken,
}

impl AuthScheme {
    pub const DEFAULT_ORDER: [AuthScheme; 4] = [
        AuthScheme::None,
        AuthScheme::Bearer,
        AuthScheme::ApiKey,
        AuthScheme::AuthToken,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AuthScheme::None => "none",
            AuthScheme::Bearer => "bearer",
            AuthScheme::ApiKey => "api-key",
            AuthScheme::AuthToken => "auth-token",
        }
    }
}

impl FromStr for AuthScheme {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "none" | "no-auth" => Ok(AuthScheme::None),
            "bearer" | "bearer-token" => Ok(AuthScheme::Bearer),
            "api-key" | "apikey" => Ok(AuthScheme::ApiKey),
            "auth-token" | "token" => Ok(AuthScheme::AuthToken),
            other => Err(AppError::new(
                EXIT_CONFIG,
                format!(
                    "Unknown auth strategy '{other}' \
                     (expected none, bearer, api-key, auth-token)."
                ),
            )),
        }
    }
}

/// Static credentials, all optional.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub bearer_token: Option<String>,
    pub api_key: Option<String>,
    pub api_key_header: String,
    pub auth_token: Option<String>,
    pub auth_token_header: String,
}

impl Credentials {
    pub fn new() -> Self {
        Self {
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            auth_token_header: DEFAULT_AUTH_TOKEN_HEADER.to_string(),
            ..Self::default()
        }
    }
}

// Secrets stay out of logs and panics.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "<set>").unwrap_or("<unset>");
        f.debug_struct("Credentials")
            .field("bearer_token", &mask(&self.bearer_token))
            .field("api_key", &mask(&self.api_key))
            .field("api_key_header", &self.api_key_header)
            .field("auth_token", &mask(&self.auth_token))
            .field("auth_token_header", &self.auth_token_header)
            .finish()
    }
}

/// One named header combination.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthStrategy {
    pub name: String,
    pub headers: Vec<(String, String)>,
}

impl std::fmt::Debug for AuthStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("AuthStrategy")
            .field("name", &self.name)
            .field("headers", &names)
            .finish()
    }
}

impl AuthStrategy {
    pub fn new(name: impl Into<String>, headers: Vec<(String, String)>) -> Self {
        Self {
            name: name.into(),
            headers,
        }
    }

    /// Build the strategy for `scheme`, or `None` if its credential is missing.
    pub fn for_scheme(scheme: AuthScheme, creds: &Credentials) -> Option<Self> {
        let headers = match scheme {
            AuthScheme::None => Vec::new(),
            AuthScheme::Bearer => {
                let token = non_empty(&creds.bearer_token)?;
                vec![("Authorization".to_string(), format!("Bearer {token}"))]
            }
            AuthScheme::ApiKey => {
                let key = non_empty(&creds.api_key)?;
                vec![(creds.api_key_header.clone(), key.to_string())]
            }
            AuthScheme::AuthToken => {
                let token = non_empty(&creds.auth_token)?;
                vec![(creds.auth_token_header.clone(), token.to_string())]
            }
        };
        Some(Self::new(scheme.name(), headers))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Build the ordered catalog. Schemes without a configured credential are
/// skipped; duplicates keep their first position.
pub fn build_catalog(order: &[AuthScheme], creds: &Credentials) -> Vec<AuthStrategy> {
    let mut catalog: Vec<AuthStrategy> = Vec::with_capacity(order.len());
    for &scheme in order {
        if catalog.iter().any(|s| s.name == scheme.name()) {
            continue;
        }
        match AuthStrategy::for_scheme(scheme, creds) {
            Some(strategy) => catalog.push(strategy),
            None => log::warn!(
                "auth strategy '{}' skipped: no credential configured",
                scheme.name()
            ),
        }
    }
    catalog
}

/// Parse a comma-separated strategy list such as `api-key,bearer,none`.
pub fn parse_order(raw: &str) -> Result<Vec<AuthScheme>, AppError> {
    let order = raw
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(AuthScheme::from_str)
        .collect::<Result<Vec<_>, _>>()?;
    if order.is_empty() {
        return Err(AppError::new(EXIT_CONFIG, "Auth strategy list is empty."));
    }
    Ok(order)
}
