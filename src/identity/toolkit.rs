//! Firebase Identity Toolkit REST client.
//!
//! Thin HTTP wrapper for `accounts:signUp` and `accounts:signInWithPassword`.
//! URL building and response parsing are pure functions for testability.

use std::time::Duration;

use super::IdentityProvider;
use super::types::{AuthResponse, ErrorEnvelope, IdentityError, PasswordAuthRequest};
use crate::config::HttpTimeouts;
use crate::profile::Credentials;

const SIGN_UP_PATH: &str = "accounts:signUp";
const SIGN_IN_PATH: &str = "accounts:signInWithPassword";

// =============================================================================
// CLIENT
// =============================================================================

pub struct IdentityToolkitClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl IdentityToolkitClient {
    /// Build a client for the given API key and endpoint base.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(api_key: String, base_url: String, timeouts: HttpTimeouts) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| IdentityError::HttpClientBuild(e.to_string()))?;
        let base_url = base_url.trim_end_matches('/').to_owned();
        Ok(Self { http, api_key, base_url })
    }

    async fn password_auth(&self, path: &str, credentials: &Credentials) -> Result<AuthResponse, IdentityError> {
        let body = PasswordAuthRequest {
            email: &credentials.email,
            password: &credentials.password,
            return_secure_token: true,
        };

        let response = self
            .http
            .post(endpoint_url(&self.base_url, path, &self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(parse_error(status, &text));
        }

        parse_response(&text)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for IdentityToolkitClient {
    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthResponse, IdentityError> {
        self.password_auth(SIGN_UP_PATH, credentials).await
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthResponse, IdentityError> {
        self.password_auth(SIGN_IN_PATH, credentials).await
    }
}

// =============================================================================
// URLS
// =============================================================================

fn endpoint_url(base_url: &str, path: &str, api_key: &str) -> String {
    format!("{base_url}/{path}?key={api_key}")
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_response(json: &str) -> Result<AuthResponse, IdentityError> {
    serde_json::from_str(json).map_err(|e| IdentityError::Parse(e.to_string()))
}

/// Turn a non-2xx body into a rejection carrying the provider's error code.
/// Unrecognized bodies fall back to an `HTTP_<status>` code with the raw text.
fn parse_error(status: u16, body: &str) -> IdentityError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let (code, message) = split_error_message(&envelope.error.message);
            IdentityError::Rejected { status, code, message }
        }
        Err(_) => IdentityError::Rejected { status, code: format!("HTTP_{status}"), message: body.to_owned() },
    }
}

/// Provider messages look like `"WEAK_PASSWORD : Password should be at least 6 characters"`.
fn split_error_message(raw: &str) -> (String, String) {
    match raw.split_once(" : ") {
        Some((code, detail)) => (code.trim().to_owned(), detail.trim().to_owned()),
        None => (raw.trim().to_owned(), String::new()),
    }
}

#[cfg(test)]
#[path = "toolkit_test.rs"]
mod tests;
