//! Inventory configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `SHELFKEEPER_DATABASE_URL` - `SQLite` connection string (falls back to
//!   `DATABASE_URL`, then `sqlite://shelfkeeper.db`)
//! - `SHELFKEEPER_HOST` - Bind address (default: 127.0.0.1)
//! - `SHELFKEEPER_PORT` - Listen port (default: 5000)
//! - `SHELFKEEPER_BASE_URL` - Public URL (default: `http://localhost:5000`)
//! - `SHELFKEEPER_UPLOAD_DIR` - Where uploaded photos are written (default: static/uploads)
//! - `SHELFKEEPER_LOW_STOCK_THRESHOLD` - Default low-stock threshold (default: 2)
//! - `SHELFKEEPER_MAX_UPLOAD_BYTES` - Request body limit for uploads (default: 10 MiB)
//! - `SHELFKEEPER_TRUST_PROXY_HEADERS` - Key the auth rate limiter on
//!   `X-Forwarded-For`/`X-Real-IP` (default: false). Only enable behind a
//!   reverse proxy that overwrites them.
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use shelfkeeper_core::LowStockThreshold;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://shelfkeeper.db";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Inventory application configuration.
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// `SQLite` database connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Directory for stored uploads
    pub upload_dir: PathBuf,
    /// Threshold used by the low-stock page when none is given
    pub low_stock_threshold: LowStockThreshold,
    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,
    /// Whether client IP headers set by a reverse proxy are believed
    pub trust_proxy_headers: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

impl InventoryConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SHELFKEEPER_DATABASE_URL");
        let host = parse_env("SHELFKEEPER_HOST", "127.0.0.1")?;
        let port = parse_env("SHELFKEEPER_PORT", "5000")?;
        let base_url = get_env_or_default("SHELFKEEPER_BASE_URL", "http://localhost:5000");
        let upload_dir = PathBuf::from(get_env_or_default(
            "SHELFKEEPER_UPLOAD_DIR",
            "static/uploads",
        ));

        let threshold: i64 = parse_env("SHELFKEEPER_LOW_STOCK_THRESHOLD", "2")?;
        let low_stock_threshold = LowStockThreshold::new(threshold).map_err(|e| {
            ConfigError::InvalidEnvVar(
                "SHELFKEEPER_LOW_STOCK_THRESHOLD".to_owned(),
                e.to_string(),
            )
        })?;

        let max_upload_bytes = parse_env(
            "SHELFKEEPER_MAX_UPLOAD_BYTES",
            &DEFAULT_MAX_UPLOAD_BYTES.to_string(),
        )?;

        let trust_proxy_headers = parse_env("SHELFKEEPER_TRUST_PROXY_HEADERS", "false")?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            upload_dir,
            low_stock_threshold,
            max_upload_bytes,
            trust_proxy_headers,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the public URL is served over HTTPS (enables secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> SecretString {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_or_else(
            |_| SecretString::from(DEFAULT_DATABASE_URL.to_owned()),
            SecretString::from,
        )
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
}
