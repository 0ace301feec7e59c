//! # authgate
//!
//! Session and profile facade for a client application backed by Firebase.
//! Signs users up and in through the Identity Toolkit REST API, keeps their
//! profile records in the Realtime Database, publishes session state through
//! `tokio::sync::watch` channels, and manages an admin-approval queue.
//!
//! [`AuthFacade`] is the entry point; the provider seams
//! ([`IdentityProvider`], [`DocumentStore`]) and the [`Navigator`] hook are
//! traits so callers and tests can substitute their own implementations.

pub mod config;
pub mod error;
pub mod facade;
pub mod identity;
pub mod navigation;
pub mod profile;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::FacadeConfig;
pub use error::{ErrorCode, FacadeError};
pub use facade::{AuthFacade, SignOutMode};
pub use identity::{AuthResponse, IdentityError, IdentityProvider};
pub use navigation::{LOGIN_ROUTE, LogNavigator, Navigator, NoopNavigator};
pub use profile::{Credentials, ROLE_ADMIN, ROLE_USER, UserData};
pub use session::{Session, SessionStore, SessionView};
pub use store::{DocumentStore, StoreError};
