//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: <http://localhost:3000>)
//! - `STOREFRONT_API_URL` - Via Fitness API base URL (default: <http://localhost:8000>)
//! - `STOREFRONT_CEP_URL` - `ViaCEP` base URL (default: <https://viacep.com.br>)
//! - `STOREFRONT_API_TIMEOUT_SECS` - Timeout for outbound calls (default: 10)
//! - `STOREFRONT_REDIRECT_DELAY_SECS` - Delay before the post-login redirect (default: 5)
//! - `STOREFRONT_STATIC_DIR` - Directory served under `/static` (default: crates/storefront/static)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0 to 1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Base URL of the Via Fitness API
    pub api_url: Url,
    /// Base URL of the `ViaCEP` postal code service
    pub cep_url: Url,
    /// Timeout applied to every outbound request
    pub api_timeout: Duration,
    /// How long the login/register success page waits before redirecting
    pub redirect_delay: Duration,
    /// Directory with the stylesheet and images
    pub static_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<SecretString>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let host = env.parse_or("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = env.parse_or("STOREFRONT_PORT", 3000_u16)?;
        let base_url = env.url_or("STOREFRONT_BASE_URL", "http://localhost:3000")?;
        let api_url = env.url_or("STOREFRONT_API_URL", "http://localhost:8000")?;
        let cep_url = env.url_or("STOREFRONT_CEP_URL", "https://viacep.com.br")?;
        let api_timeout = Duration::from_secs(env.parse_or("STOREFRONT_API_TIMEOUT_SECS", 10_u64)?);
        let redirect_delay =
            Duration::from_secs(env.parse_or("STOREFRONT_REDIRECT_DELAY_SECS", 5_u64)?);
        let static_dir = env
            .get("STOREFRONT_STATIC_DIR")
            .map_or_else(|| PathBuf::from("crates/storefront/static"), PathBuf::from);

        let sentry_dsn = env.get("SENTRY_DSN").map(SecretString::from);
        let sentry_environment = env.get("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env.rate_or("SENTRY_SAMPLE_RATE", 1.0)?;
        let sentry_traces_sample_rate = env.rate_or("SENTRY_TRACES_SAMPLE_RATE", 0.0)?;

        Ok(Self {
            host,
            port,
            base_url,
            api_url,
            cep_url,
            api_timeout,
            redirect_delay,
            static_dir,
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

    /// Whether the session cookie must carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get a variable, treating blank values as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    /// Parse a variable, or fall back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    /// Parse an absolute http(s) URL.
    fn url_or(&self, key: &str, default: &str) -> Result<Url, ConfigError> {
        let raw = self.get(key).unwrap_or_else(|| default.to_string());
        let url = Url::parse(raw.trim())
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(url)
    }

    /// Parse a sample rate in `0.0..=1.0`.
    fn rate_or(&self, key: &str, default: f32) -> Result<f32, ConfigError> {
        let rate = self.parse_or(key, default)?;
        if (0.0..=1.0).contains(&rate) {
            Ok(rate)
        } else {
            Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("{rate} is outside 0.0..=1.0"),
            ))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_source(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.api_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.cep_url.as_str(), "https://viacep.com.br/");
        assert_eq!(config.redirect_delay, Duration::from_secs(5));
        assert_eq!(config.api_timeout, Duration::from_secs(10));
        assert!(config.sentry_dsn.is_none());
        assert!(!config.secure_cookies());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STOREFRONT_PORT", "8080"),
            ("STOREFRONT_BASE_URL", "https://loja.viafitness.com.br"),
            ("STOREFRONT_API_URL", "http://api:8000"),
            ("STOREFRONT_REDIRECT_DELAY_SECS", "0"),
            ("SENTRY_TRACES_SAMPLE_RATE", "0.25"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.secure_cookies());
        assert_eq!(config.api_url.host_str(), Some("api"));
        assert_eq!(config.redirect_delay, Duration::ZERO);
        assert!((config.sentry_traces_sample_rate - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_blank_values_use_default() {
        let config = load(&[("STOREFRONT_PORT", "  ")]).unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("STOREFRONT_PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let err = load(&[("STOREFRONT_API_URL", "ftp://files")]).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_sample_rate_range() {
        assert!(load(&[("SENTRY_SAMPLE_RATE", "1.5")]).is_err());
    }

    #[test]
    fn test_debug_redacts_dsn() {
        let config = load(&[("SENTRY_DSN", "https://key@sentry.example/1")]).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("key@sentry"));
    }
}
