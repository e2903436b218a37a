//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;
use url::Url;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `ACCOUNT_SERVICE_URL` (required): base URL of the account service
/// - `BALANCE_SERVICE_URL` (required): endpoint notified after each debit
/// - `FEE_SERVICE_URL` (required): base URL of the fee service
/// - `ACCOUNT_SERVICE_API_ID` / `BALANCE_SERVICE_API_ID` /
///   `FEE_SERVICE_API_ID` (optional): per-service `x-apigw-api-id`
///   routing header values, default empty
/// - `BREAKER_FAILURE_THRESHOLD` (optional): consecutive failures before
///   the fee-flow circuit breaker opens, defaults to 3
/// - `BREAKER_COOLDOWN_SECS` (optional): seconds the breaker stays open
///   before admitting a probe, defaults to 30
/// - `HTTP_TIMEOUT_SECS` (optional): per-request timeout for downstream
///   calls, defaults to 10
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    pub account_service_url: String,
    pub balance_service_url: String,
    pub fee_service_url: String,

    #[serde(default)]
    pub account_service_api_id: String,
    #[serde(default)]
    pub balance_service_api_id: String,
    #[serde(default)]
    pub fee_service_api_id: String,

    #[serde(default = "default_breaker_threshold")]
    pub breaker_failure_threshold: u32,

    #[serde(default = "default_breaker_cooldown")]
    pub breaker_cooldown_secs: u64,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_breaker_threshold() -> u32 {
    3
}

fn default_breaker_cooldown() -> u64 {
    30
}

fn default_http_timeout() -> u64 {
    10
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config
    /// struct, then validates the downstream service URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    /// - A downstream service URL is not a valid absolute URL
    pub fn from_env() -> anyhow::Result<Self> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Parse environment variables into Config struct
        // Field names are automatically converted: database_url -> DATABASE_URL
        let config = envy::from_env::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject malformed service URLs at startup rather than on the first
    /// booked debit.
    fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("ACCOUNT_SERVICE_URL", &self.account_service_url),
            ("BALANCE_SERVICE_URL", &self.balance_service_url),
            ("FEE_SERVICE_URL", &self.fee_service_url),
        ] {
            Url::parse(value).map_err(|err| anyhow::anyhow!("invalid {name} '{value}': {err}"))?;
        }
        Ok(())
    }
}
