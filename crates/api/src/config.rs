//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CATALOG_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `BARCODE_LOOKUP_API_KEY` - Barcode lookup API key (falls back to `API_KEY`)
//!
//! ## Optional
//! - `CATALOG_HOST` - Bind address (default: 127.0.0.1)
//! - `CATALOG_PORT` - Listen port (default: 5000)
//! - `BARCODE_LOOKUP_BASE_URL` - Lookup API base URL (default: <https://api.barcodelookup.com/v3>)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sample rates (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

pub const DEFAULT_LOOKUP_BASE_URL: &str = "https://api.barcodelookup.com/v3";

/// Template values left in place of a real key (compared case-insensitively).
const PLACEHOLDER_KEYS: &[&str] = &[
    "your-api-key",
    "your-api-key-here",
    "your_api_key",
    "<api_key>",
    "api_key",
    "changeme",
    "placeholder",
    "todo",
    "xxx",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Catalog service configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Barcode lookup API configuration
    pub lookup: BarcodeLookupConfig,
    /// Emit JSON logs instead of human-readable text
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Barcode lookup API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BarcodeLookupConfig {
    /// API key sent as the `key` query parameter
    pub api_key: SecretString,
    /// Base URL, without the `/products` suffix
    pub base_url: Url,
}

impl std::fmt::Debug for BarcodeLookupConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarcodeLookupConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl BarcodeLookupConfig {
    /// Build a lookup configuration from explicit values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not a valid URL.
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: SecretString::from(api_key.into()),
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Load only the lookup settings from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the API key is missing or a placeholder, or
    /// the base URL is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let lookup = |key: &str| std::env::var(key).ok();
        Self::from_source(&EnvSource(&lookup))
    }

    fn from_source(env: &EnvSource<'_>) -> Result<Self, ConfigError> {
        let api_key = env
            .first_of(&["BARCODE_LOOKUP_API_KEY", "API_KEY"])
            .ok_or_else(|| ConfigError::MissingEnvVar("BARCODE_LOOKUP_API_KEY".to_string()))?;
        reject_placeholder(&api_key, "BARCODE_LOOKUP_API_KEY")?;

        let base_url = env.or_default("BARCODE_LOOKUP_BASE_URL", DEFAULT_LOOKUP_BASE_URL);

        Ok(Self {
            api_key: SecretString::from(api_key),
            base_url: parse_base_url(&base_url)?,
        })
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let lookup = |key: &str| std::env::var(key).ok();
        Self::from_source(&EnvSource(&lookup))
    }

    /// Load configuration from an explicit map of variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let lookup = |key: &str| vars.get(key).cloned();
        Self::from_source(&EnvSource(&lookup))
    }

    fn from_source(env: &EnvSource<'_>) -> Result<Self, ConfigError> {
        let database_url = database_url(env)?;
        let host = env
            .or_default("CATALOG_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("CATALOG_HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("CATALOG_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("CATALOG_PORT".to_string(), e.to_string()))?;

        let lookup = BarcodeLookupConfig::from_source(env)?;

        let json_logs = env
            .get("LOG_FORMAT")
            .is_some_and(|format| format.eq_ignore_ascii_case("json"));
        let sentry_dsn = env.get("SENTRY_DSN");
        let sentry_environment = env.get("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env
            .get("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .get("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            lookup,
            json_logs,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Resolve the database URL alone, for tools that only need the database.
///
/// Reads `CATALOG_DATABASE_URL`, then `DATABASE_URL`, after loading `.env`.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if neither is set to a non-empty value.
pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
    let _ = dotenvy::dotenv();

    let lookup = |key: &str| std::env::var(key).ok();
    database_url(&EnvSource(&lookup))
}

// =============================================================================
// Helper Functions
// =============================================================================

fn database_url(env: &EnvSource<'_>) -> Result<SecretString, ConfigError> {
    env.first_of(&["CATALOG_DATABASE_URL", "DATABASE_URL"])
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar("CATALOG_DATABASE_URL".to_string()))
}

/// Variable source; the process environment in production, a map in tests.
struct EnvSource<'a>(&'a dyn Fn(&str) -> Option<String>);

impl EnvSource<'_> {
    /// Get a variable, treating empty values as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get the first variable that is set.
    fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.get(key))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }
}

/// Parse the lookup base URL, dropping any trailing slash.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim_end_matches('/')).map_err(|e| {
        ConfigError::InvalidEnvVar("BARCODE_LOOKUP_BASE_URL".to_string(), e.to_string())
    })?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "BARCODE_LOOKUP_BASE_URL".to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }

    Ok(url)
}

/// Reject a secret that is exactly a known template value.
fn reject_placeholder(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let normalized = secret.trim().to_lowercase();
    if PLACEHOLDER_KEYS.contains(&normalized.as_str()) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            "is a placeholder value".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    const KEY: &str = "q8w7e6r5t4y3u2i1o0pAsDfGhJkL";

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = CatalogConfig::from_map(&vars(&[
            ("CATALOG_DATABASE_URL", "postgres://localhost/catalog"),
            ("BARCODE_LOOKUP_API_KEY", KEY),
        ]))
        .unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:5000");
        assert_eq!(
            config.lookup.base_url.as_str(),
            "https://api.barcodelookup.com/v3"
        );
        assert!(!config.json_logs);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_database_url_fails_fast() {
        let err = CatalogConfig::from_map(&vars(&[("BARCODE_LOOKUP_API_KEY", KEY)])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "CATALOG_DATABASE_URL"));
    }

    #[test]
    fn test_missing_api_key_fails_fast() {
        let err = CatalogConfig::from_map(&vars(&[(
            "CATALOG_DATABASE_URL",
            "postgres://localhost/catalog",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "BARCODE_LOOKUP_API_KEY"));
    }

    #[test]
    fn test_legacy_variable_names_are_accepted() {
        let config = CatalogConfig::from_map(&vars(&[
            ("DATABASE_URL", "postgres://localhost/legacy"),
            ("API_KEY", KEY),
        ]))
        .unwrap();

        assert_eq!(
            config.database_url.expose_secret(),
            "postgres://localhost/legacy"
        );
        assert_eq!(config.lookup.api_key.expose_secret(), KEY);
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let err = CatalogConfig::from_map(&vars(&[
            ("CATALOG_DATABASE_URL", "  "),
            ("BARCODE_LOOKUP_API_KEY", KEY),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = CatalogConfig::from_map(&vars(&[
            ("CATALOG_DATABASE_URL", "postgres://localhost/catalog"),
            ("BARCODE_LOOKUP_API_KEY", KEY),
            ("CATALOG_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref v, _) if v == "CATALOG_PORT"));
    }

    #[test]
    fn test_placeholder_api_key_is_rejected() {
        let err = CatalogConfig::from_map(&vars(&[
            ("CATALOG_DATABASE_URL", "postgres://localhost/catalog"),
            ("BARCODE_LOOKUP_API_KEY", "your-api-key-here"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = BarcodeLookupConfig::new(KEY, "http://127.0.0.1:9000/v3/").unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:9000/v3");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(BarcodeLookupConfig::new(KEY, "not a url").is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = BarcodeLookupConfig::new(KEY, DEFAULT_LOOKUP_BASE_URL).unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(KEY));
    }

    #[test]
    fn test_vendor_key_containing_placeholder_words_is_accepted() {
        let key = "a9F3kTodoQ7zLm2Xp8Rw4Vb6Nc1Hj5Gs";
        let config = CatalogConfig::from_map(&vars(&[
            ("CATALOG_DATABASE_URL", "postgres://localhost/catalog"),
            ("BARCODE_LOOKUP_API_KEY", key),
        ]))
        .unwrap();
        assert_eq!(config.lookup.api_key.expose_secret(), key);

        for key in ["example1234", "aaaaaaaaaaaa", "replace-me-not"] {
            assert!(reject_placeholder(key, "TEST_VAR").is_ok(), "{key}");
        }
    }

    #[test]
    fn test_placeholder_match_ignores_case_and_whitespace() {
        assert!(reject_placeholder(" TODO ", "TEST_VAR").is_err());
        assert!(reject_placeholder("Your_API_Key", "TEST_VAR").is_err());
    }

    #[test]
    fn test_database_url_prefers_catalog_variable() {
        let both = vars(&[
            ("CATALOG_DATABASE_URL", "postgres://localhost/catalog"),
            ("DATABASE_URL", "postgres://localhost/legacy"),
        ]);
        let lookup = |key: &str| both.get(key).cloned();
        let url = database_url(&EnvSource(&lookup)).unwrap();
        assert_eq!(url.expose_secret(), "postgres://localhost/catalog");

        let blank = vars(&[("CATALOG_DATABASE_URL", ""), ("DATABASE_URL", "postgres://localhost/legacy")]);
        let lookup = |key: &str| blank.get(key).cloned();
        let url = database_url(&EnvSource(&lookup)).unwrap();
        assert_eq!(url.expose_secret(), "postgres://localhost/legacy");

        let none: HashMap<String, String> = HashMap::new();
        let lookup = |key: &str| none.get(key).cloned();
        assert!(matches!(
            database_url(&EnvSource(&lookup)),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }
}
