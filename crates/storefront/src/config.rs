//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_ALLOWED_ORIGIN` - Origin of the customer web app, for CORS
//! - `GEOCODER_BASE_URL` - Nominatim-compatible endpoint (default: <https://nominatim.openstreetmap.org>)
//! - `GEOCODER_COUNTRY_CODES` - Restrict results to these countries (default: br)
//! - `GEOCODER_LANGUAGE` - `Accept-Language` sent to the geocoder (default: pt-BR)
//! - `GEOCODER_USER_AGENT` - `User-Agent` sent to the geocoder (default: Forno/1.0)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Origin allowed to call the API from a browser
    pub allowed_origin: Option<String>,
    /// Address search backend
    pub geocoder: GeocoderConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (production, staging, ...)
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Geocoding (address search) configuration.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Base URL; `/search` is appended
    pub base_url: Url,
    /// Comma-separated ISO country codes
    pub country_codes: String,
    /// Preferred result language
    pub language: String,
    /// Identifies this application to the geocoder
    pub user_agent: String,
}

const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

impl Default for GeocoderConfig {
    /// Public Nominatim, Brazilian results in Portuguese.
    ///
    /// # Panics
    ///
    /// Never panics: the default URL is a valid constant.
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_GEOCODER_URL).expect("default geocoder URL is valid"),
            country_codes: "br".to_string(),
            language: "pt-BR".to_string(),
            user_agent: "Forno/1.0".to_string(),
        }
    }
}

impl StorefrontConfig {
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

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let allowed_origin = get_optional_env("STOREFRONT_ALLOWED_ORIGIN");

        let geocoder = GeocoderConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            allowed_origin,
            geocoder,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_rate("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl GeocoderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_env_or_default("GEOCODER_BASE_URL", DEFAULT_GEOCODER_URL);
        let base_url = Url::parse(&raw).map_err(|e| {
            ConfigError::InvalidEnvVar("GEOCODER_BASE_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            base_url,
            country_codes: get_env_or_default("GEOCODER_COUNTRY_CODES", "br"),
            language: get_env_or_default("GEOCODER_LANGUAGE", "pt-BR"),
            user_agent: get_env_or_default("GEOCODER_USER_AGENT", "Forno/1.0"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a sampling rate in `0.0..=1.0`.
fn get_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}
