//! Configuration for the Centrifugo HTTP API client

use std::time::Duration;
use thiserror::Error;

const URL_VAR: &str = "CENTRIFUGO_URL";
const API_KEY_VAR: &str = "CENTRIFUGO_API_KEY";
const TIMEOUT_VAR: &str = "CENTRIFUGO_TIMEOUT_SECS";
const INSECURE_VAR: &str = "CENTRIFUGO_INSECURE";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Connection settings for a Centrifugo server
#[derive(Clone)]
pub struct CentrifugoConfig {
    /// Server URL (e.g., "http://localhost:8000")
    pub url: String,

    /// Server API key, sent as `X-API-Key`
    pub api_key: String,

    /// Timeout for a single API call
    pub timeout: Duration,

    /// Whether to skip TLS certificate verification (for development)
    pub dangerous_skip_cert_verify: bool,
}

impl CentrifugoConfig {
    /// Create a new configuration with the given URL and API key
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(10),
            dangerous_skip_cert_verify: false,
        }
    }

    /// Read `CENTRIFUGO_URL`, `CENTRIFUGO_API_KEY`, and optionally
    /// `CENTRIFUGO_TIMEOUT_SECS` and `CENTRIFUGO_INSECURE`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with variables resolved by `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(URL_VAR).ok_or(ConfigError::Missing(URL_VAR))?;
        let api_key = lookup(API_KEY_VAR).ok_or(ConfigError::Missing(API_KEY_VAR))?;

        let mut config = Self::new(url, api_key);

        if let Some(value) = lookup(TIMEOUT_VAR) {
            let secs = value.trim().parse().map_err(|_| ConfigError::Invalid {
                var: TIMEOUT_VAR,
                value: value.clone(),
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(value) = lookup(INSECURE_VAR) {
            config.dangerous_skip_cert_verify =
                parse_flag(&value).ok_or(ConfigError::Invalid {
                    var: INSECURE_VAR,
                    value,
                })?;
        }

        Ok(config)
    }

    /// Set the per-call timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Skip TLS certificate verification (DANGEROUS - only for development)
    pub fn dangerous_skip_cert_verify(mut self) -> Self {
        self.dangerous_skip_cert_verify = true;
        self
    }

    /// Full URL of a server API method
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/api/{}", self.url.trim_end_matches('/'), method)
    }
}

/// Boolean environment value, accepting the spellings clap's boolish parser does
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

impl std::fmt::Debug for CentrifugoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CentrifugoConfig")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .field("dangerous_skip_cert_verify", &self.dangerous_skip_cert_verify)
            .finish()
    }
}
