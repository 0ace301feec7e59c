//! Document store seam.
//!
//! DESIGN
//! ======
//! Paths are slash-separated keys relative to the store root (`users/<id>`,
//! `adminsToApprove`). The store deals in untyped JSON; typing happens in
//! the facade so listing calls can hand raw collections back to callers.

pub mod realtime_db;

pub use realtime_db::RealtimeDbClient;

use serde_json::Value;

use crate::error::{ErrorCode, retryable_status};

/// Collection holding per-user profile records.
pub const USERS: &str = "users";
/// Collection holding pending admin-registration requests.
pub const ADMINS_TO_APPROVE: &str = "adminsToApprove";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The HTTP request never produced a response.
    #[error("store request failed: {0}")]
    Request(String),

    /// The store answered with a non-success status.
    #[error("store response error: status {status}")]
    Status { status: u16, body: String },

    /// The store response body could not be deserialized.
    #[error("store response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_STORE_REQUEST",
            Self::Status { .. } => "E_STORE_STATUS",
            Self::Parse(_) => "E_STORE_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::Status { status, .. } => retryable_status(*status),
            _ => false,
        }
    }
}

// =============================================================================
// DOCUMENT STORE TRAIT
// =============================================================================

/// Async key/document store. Enables mocking in tests.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the document at `path`. `Ok(None)` means nothing is stored there.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on transport, status or decode failure.
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on transport or status failure.
    async fn put(&self, path: &str, value: &Value) -> Result<(), StoreError>;

    /// Append `value` under the collection at `path`, returning the generated key.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on transport, status or decode failure.
    async fn post(&self, path: &str, value: &Value) -> Result<String, StoreError>;

    /// Remove the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on transport or status failure.
    async fn delete(&self, path: &str) -> Result<(), StoreError>;
}

/// Join a collection and a key into a store path. The key is percent-encoded
/// as a single segment.
#[must_use]
pub fn child_path(collection: &str, key: &str) -> String {
    format!("{collection}/{}", urlencoding::encode(key))
}
