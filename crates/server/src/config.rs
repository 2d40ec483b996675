//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `USERDIR_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `USERDIR_HOST` - Bind address (default: 127.0.0.1)
//! - `USERDIR_PORT` - Listen port (default: 3000)
//! - `USERDIR_UPLOAD_DIR` - Directory for stored profile images (default: public/uploads)
//! - `USERDIR_UPLOAD_URL_PREFIX` - URL prefix images are served under (default: /uploads)
//! - `USERDIR_MAX_UPLOAD_BYTES` - Request body limit for uploads (default: 5 MiB)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Default request body limit for profile image uploads.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory profile images are written to
    pub upload_dir: PathBuf,
    /// URL prefix stored image references start with (no trailing slash)
    pub upload_url_prefix: String,
    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,
    /// Emit JSON logs instead of text
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

impl ServerConfig {
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

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("USERDIR_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("USERDIR_DATABASE_URL".to_string()))?;

        let host = parse_env(&lookup, "USERDIR_HOST", "127.0.0.1")?;
        let port = parse_env(&lookup, "USERDIR_PORT", "3000")?;
        let upload_dir = PathBuf::from(get_env_or_default(
            &lookup,
            "USERDIR_UPLOAD_DIR",
            "public/uploads",
        ));
        let upload_url_prefix = normalize_url_prefix(&get_env_or_default(
            &lookup,
            "USERDIR_UPLOAD_URL_PREFIX",
            "/uploads",
        ))?;
        let max_upload_bytes = parse_env(
            &lookup,
            "USERDIR_MAX_UPLOAD_BYTES",
            &DEFAULT_MAX_UPLOAD_BYTES.to_string(),
        )?;
        let log_json = lookup("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json"));

        let sentry_dsn = lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty());
        let sentry_environment = lookup("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = lookup("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = lookup("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);

        Ok(Self {
            database_url,
            host,
            port,
            upload_dir,
            upload_url_prefix,
            max_upload_bytes,
            log_json,
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

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an environment variable with a default value.
fn get_env_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to a default literal.
fn parse_env<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(lookup, key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate the upload URL prefix: absolute, not the root, no trailing slash.
fn normalize_url_prefix(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !trimmed.starts_with('/') || trimmed.len() < 2 {
        return Err(ConfigError::InvalidEnvVar(
            "USERDIR_UPLOAD_URL_PREFIX".to_string(),
            format!("must be an absolute path below the root (got '{raw}')"),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            ServerConfig::from_lookup(lookup_from(&[("USERDIR_DATABASE_URL", "postgres://db")]))
                .unwrap();

        assert_eq!(config.database_url.expose_secret(), "postgres://db");
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.upload_dir, PathBuf::from("public/uploads"));
        assert_eq!(config.upload_url_prefix, "/uploads");
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(!config.log_json);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_database_url_falls_back_to_generic_var() {
        let config =
            ServerConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://fallback")]))
                .unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fallback");
    }

    #[test]
    fn test_missing_database_url() {
        let err = ServerConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "USERDIR_DATABASE_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_lookup(lookup_from(&[
            ("USERDIR_DATABASE_URL", "postgres://db"),
            ("USERDIR_PORT", "http"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "USERDIR_PORT"));
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("USERDIR_DATABASE_URL", "postgres://db"),
            ("USERDIR_HOST", "0.0.0.0"),
            ("USERDIR_PORT", "8080"),
            ("USERDIR_UPLOAD_DIR", "/var/lib/userdir"),
            ("USERDIR_UPLOAD_URL_PREFIX", "/media/avatars/"),
            ("USERDIR_MAX_UPLOAD_BYTES", "1024"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.upload_dir, PathBuf::from("/var/lib/userdir"));
        assert_eq!(config.upload_url_prefix, "/media/avatars");
        assert_eq!(config.max_upload_bytes, 1024);
        assert!(config.log_json);
    }

    #[test]
    fn test_rejects_root_or_relative_prefix() {
        assert!(normalize_url_prefix("/").is_err());
        assert!(normalize_url_prefix("uploads").is_err());
        assert_eq!(normalize_url_prefix("/uploads").unwrap(), "/uploads");
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = ServerConfig::from_lookup(lookup_from(&[(
            "USERDIR_DATABASE_URL",
            "postgres://user:hunter2@db/userdir",
        )]))
        .unwrap();

        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("hunter2"));
    }
}
