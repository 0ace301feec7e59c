//! Facade error taxonomy.
//!
//! DESIGN
//! ======
//! Each provider seam owns its own error enum (`IdentityError`, `StoreError`).
//! `FacadeError` is what callers see. Document-store failures are collapsed
//! into `FetchFailed` / `SaveFailed` / `DeleteFailed` after the cause has been
//! logged, so UI code only branches on what it can act on. The cause is gone
//! by then, so the collapsed variants never report themselves retryable.
//! Identity failures are carried through intact so the provider's error code
//! reaches the caller.

use crate::identity::IdentityError;

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code and retryable flag, shared by every error enum in the crate.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// `true` for HTTP statuses worth retrying at a higher layer.
pub(crate) fn retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500..=599)
}

// =============================================================================
// FACADE ERROR
// =============================================================================

/// Errors surfaced by [`AuthFacade`](crate::facade::AuthFacade) operations.
#[derive(Debug, thiserror::Error)]
pub enum FacadeError {
    /// The identity provider call failed or was rejected.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The provider's `expiresIn` value was not a whole number of seconds.
    #[error("invalid token lifetime: {0}")]
    InvalidExpiry(String),

    /// Sign-up succeeded but the profile record could not be written.
    #[error("account {user_id} created but profile was not saved")]
    ProfileNotSaved { user_id: String },

    /// The document store holds no profile for the requested user.
    #[error("user data not found")]
    NotFound,

    #[error("failed to fetch user data")]
    FetchFailed,

    #[error("failed to save user data")]
    SaveFailed,

    #[error("failed to delete admin data")]
    DeleteFailed,

    /// The session store was dropped while a view was waiting on it.
    #[error("session store closed")]
    Closed,

    /// A required configuration variable is not set.
    #[error("missing config: env var {var} not set")]
    MissingConfig { var: String },

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// A provider HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for FacadeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Identity(e) => e.error_code(),
            Self::InvalidExpiry(_) => "E_INVALID_EXPIRY",
            Self::ProfileNotSaved { .. } => "E_PROFILE_NOT_SAVED",
            Self::NotFound => "E_NOT_FOUND",
            Self::FetchFailed => "E_FETCH_FAILED",
            Self::SaveFailed => "E_SAVE_FAILED",
            Self::DeleteFailed => "E_DELETE_FAILED",
            Self::Closed => "E_CLOSED",
            Self::MissingConfig { .. } => "E_MISSING_CONFIG",
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Identity(e) => e.retryable(),
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
