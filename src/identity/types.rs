//! Identity provider wire types and errors.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, retryable_status};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by identity provider calls.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The HTTP request never produced a response.
    #[error("identity request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success status.
    #[error("identity provider rejected request ({status}): {code}")]
    Rejected { status: u16, code: String, message: String },

    /// The provider response body could not be deserialized.
    #[error("identity response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl IdentityError {
    /// Provider error code (`EMAIL_EXISTS`, `INVALID_PASSWORD`, ...), if any.
    #[must_use]
    pub fn provider_code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl ErrorCode for IdentityError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_IDENTITY_REQUEST",
            Self::Rejected { .. } => "E_IDENTITY_REJECTED",
            Self::Parse(_) => "E_IDENTITY_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::Rejected { status, .. } => retryable_status(*status),
            _ => false,
        }
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Body of a sign-up / sign-in request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PasswordAuthRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

/// Sign-up / sign-in response.
///
/// `refresh_token`, `kind` and `registered` are accepted but never consumed;
/// there is no token refresh flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub kind: String,
    pub id_token: String,
    pub email: String,
    #[serde(default)]
    pub refresh_token: String,
    pub local_id: String,
    /// Token lifetime in seconds, sent as a decimal string.
    pub expires_in: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered: Option<bool>,
}

/// Error envelope returned by the provider on non-2xx responses:
/// `{"error": {"code": 400, "message": "EMAIL_EXISTS", ...}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
