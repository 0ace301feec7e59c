//! Facade configuration parsed from environment variables.

use std::time::Duration;

use crate::error::FacadeError;

pub const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_SIGN_OUT_DELAY_MS: u64 = 1000;
pub const DEFAULT_HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_HTTP_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_HTTP_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacadeConfig {
    pub api_key: String,
    pub identity_base_url: String,
    pub db_url: String,
    pub sign_out_delay: Duration,
    pub timeouts: HttpTimeouts,
}

impl FacadeConfig {
    /// Config with defaults for everything except the two required values.
    #[must_use]
    pub fn new(api_key: impl Into<String>, db_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            identity_base_url: DEFAULT_IDENTITY_BASE_URL.to_owned(),
            db_url: normalize_url(&db_url.into()),
            sign_out_delay: Duration::from_millis(DEFAULT_SIGN_OUT_DELAY_MS),
            timeouts: HttpTimeouts::default(),
        }
    }

    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `FIREBASE_API_KEY`
    /// - `FIREBASE_DB_URL`
    ///
    /// Optional:
    /// - `FIREBASE_IDENTITY_URL`: default Identity Toolkit v1 base
    /// - `SIGN_OUT_DELAY_MS`: default 1000
    /// - `HTTP_REQUEST_TIMEOUT_SECS`: default 30
    /// - `HTTP_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::MissingConfig`] if a required variable is unset or
    /// blank, and [`FacadeError::ConfigParse`] if a numeric override is malformed.
    pub fn from_env() -> Result<Self, FacadeError> {
        let api_key = required_env("FIREBASE_API_KEY")?;
        let db_url = required_env("FIREBASE_DB_URL")?;

        let identity_base_url = std::env::var("FIREBASE_IDENTITY_URL")
            .map_or_else(|_| DEFAULT_IDENTITY_BASE_URL.to_owned(), |raw| normalize_url(&raw));
        let sign_out_delay =
            Duration::from_millis(env_parse_u64("SIGN_OUT_DELAY_MS", DEFAULT_SIGN_OUT_DELAY_MS)?);
        let timeouts = HttpTimeouts {
            request_secs: env_parse_u64("HTTP_REQUEST_TIMEOUT_SECS", DEFAULT_HTTP_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse_u64("HTTP_CONNECT_TIMEOUT_SECS", DEFAULT_HTTP_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self { api_key, identity_base_url, db_url: normalize_url(&db_url), sign_out_delay, timeouts })
    }
}

fn required_env(key: &str) -> Result<String, FacadeError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_owned()),
        _ => Err(FacadeError::MissingConfig { var: key.into() }),
    }
}

fn env_parse_u64(key: &str, default: u64) -> Result<u64, FacadeError> {
    match std::env::var(key) {
        Ok(raw) => parse_u64(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_u64(key: &str, raw: &str) -> Result<u64, FacadeError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| FacadeError::ConfigParse(format!("{key} must be a non-negative integer, got '{raw}'")))
}

fn normalize_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
