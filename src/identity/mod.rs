//! Identity provider seam.
//!
//! DESIGN
//! ======
//! The facade talks to the identity provider only through the
//! `IdentityProvider` trait so tests can swap in a scripted mock. The one
//! production implementation is `IdentityToolkitClient`, which speaks the
//! Firebase Identity Toolkit REST API.

pub mod toolkit;
pub mod types;

pub use toolkit::IdentityToolkitClient;
pub use types::{AuthResponse, IdentityError};

use crate::profile::Credentials;

/// Provider-neutral async trait for password sign-up and sign-in. Enables mocking in tests.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a new account for the given credentials.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentityError`] if the request fails or the provider rejects it
    /// (for example `EMAIL_EXISTS`).
    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthResponse, IdentityError>;

    /// Sign in with an existing email/password pair.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentityError`] if the request fails or the provider rejects it
    /// (for example `INVALID_PASSWORD`).
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthResponse, IdentityError>;
}
