//! Session & profile facade.
//!
//! ARCHITECTURE
//! ============
//! `AuthFacade` is the single entry point UI code talks to. Each operation
//! issues one or more calls through the `IdentityProvider` / `DocumentStore`
//! seams and then updates local state: the session store, the loading flag,
//! and the admin-request badge counter. UI surfaces observe that state through
//! `watch` receivers and `SessionView`s instead of polling.
//!
//! TRADE-OFFS
//! ==========
//! Registration awaits the profile write and reports `ProfileNotSaved` when it
//! fails. The session is still installed in that case because the provider
//! account already exists; the caller decides whether to retry the write or
//! sign the user out.
//!
//! Document-store failures are logged with their cause and surfaced as the
//! generic `FetchFailed` / `SaveFailed` / `DeleteFailed`. Callers cannot tell a
//! network failure from a permission failure, only that the operation failed.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::FacadeConfig;
use crate::error::FacadeError;
use crate::identity::{AuthResponse, IdentityProvider, IdentityToolkitClient};
use crate::navigation::{LOGIN_ROUTE, Navigator};
use crate::profile::{Credentials, UserData};
use crate::session::{self, Session, SessionStore, SessionView};
use crate::store::{ADMINS_TO_APPROVE, DocumentStore, RealtimeDbClient, USERS, child_path};

/// Whether a sign-out drives the shared loading flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutMode {
    /// Raise the loading flag immediately and drop it when the session clears.
    WithLoading,
    /// Leave the loading flag alone; the caller shows its own indicator.
    Quiet,
}

// =============================================================================
// FACADE
// =============================================================================

/// Cheap to clone; every clone shares the same session and signals.
#[derive(Clone)]
pub struct AuthFacade {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    navigator: Arc<dyn Navigator>,
    session: Arc<SessionStore>,
    loading: Arc<watch::Sender<bool>>,
    admin_requests: Arc<watch::Sender<u32>>,
    sign_out_delay: Duration,
}

impl AuthFacade {
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        navigator: Arc<dyn Navigator>,
        sign_out_delay: Duration,
    ) -> Self {
        let (loading, _) = watch::channel(false);
        let (admin_requests, _) = watch::channel(0);
        Self {
            identity,
            store,
            navigator,
            session: Arc::new(SessionStore::new()),
            loading: Arc::new(loading),
            admin_requests: Arc::new(admin_requests),
            sign_out_delay,
        }
    }

    /// Build a facade backed by the Firebase REST clients.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::HttpClientBuild`] if either HTTP client fails to build.
    pub fn from_config(config: &FacadeConfig, navigator: Arc<dyn Navigator>) -> Result<Self, FacadeError> {
        let identity =
            IdentityToolkitClient::new(config.api_key.clone(), config.identity_base_url.clone(), config.timeouts)
                .map_err(|e| FacadeError::HttpClientBuild(e.to_string()))?;
        let store = RealtimeDbClient::new(config.db_url.clone(), config.timeouts)
            .map_err(|e| FacadeError::HttpClientBuild(e.to_string()))?;
        Ok(Self::new(Arc::new(identity), Arc::new(store), navigator, config.sign_out_delay))
    }

    // =========================================================================
    // SIGN-UP / SIGN-IN
    // =========================================================================

    /// Create an account, install its session, then persist the profile under
    /// the new user id.
    ///
    /// # Errors
    ///
    /// - [`FacadeError::Identity`] if the provider rejects the sign-up.
    /// - [`FacadeError::InvalidExpiry`] if the token lifetime is malformed. The
    ///   profile is still written and the session is left untouched.
    /// - [`FacadeError::ProfileNotSaved`] if the account was created but the
    ///   profile write failed. Takes precedence over `InvalidExpiry`.
    pub async fn register(&self, profile: &UserData) -> Result<AuthResponse, FacadeError> {
        let ticket = self.session.begin();
        let resp = self
            .identity
            .sign_up(&profile.credentials())
            .await
            .inspect_err(|e| warn!(error = %e, "sign-up failed"))?;

        // The account exists from here on, so the profile is written even
        // when the session cannot be built.
        let installed = self.install_session(ticket, &resp);
        info!(user_id = %resp.local_id, role = %profile.role, "user registered");

        self.save_user_data(&resp.local_id, profile).await?;
        installed?;
        Ok(resp)
    }

    /// Sign in and replace the current session. No profile is written.
    ///
    /// # Errors
    ///
    /// - [`FacadeError::Identity`] carrying the provider's error code
    ///   (`EMAIL_NOT_FOUND`, `INVALID_PASSWORD`, ...) on rejection.
    /// - [`FacadeError::InvalidExpiry`] if the token lifetime is malformed.
    pub async fn log_in(&self, credentials: &Credentials) -> Result<AuthResponse, FacadeError> {
        let ticket = self.session.begin();
        let resp = self
            .identity
            .sign_in(credentials)
            .await
            .inspect_err(|e| warn!(error = %e, "sign-in failed"))?;

        self.install_session(ticket, &resp)?;
        info!(user_id = %resp.local_id, "user signed in");
        Ok(resp)
    }

    fn install_session(&self, ticket: u64, resp: &AuthResponse) -> Result<(), FacadeError> {
        let session = Session::from_auth_response(resp, OffsetDateTime::now_utc())?;
        if !self.session.commit(ticket, Some(session)) {
            warn!(user_id = %resp.local_id, "session superseded by a newer sign-in or sign-out");
        }
        Ok(())
    }

    async fn save_user_data(&self, user_id: &str, profile: &UserData) -> Result<(), FacadeError> {
        let not_saved = || FacadeError::ProfileNotSaved { user_id: user_id.to_owned() };
        let doc = serde_json::to_value(profile).map_err(|e| {
            error!(error = %e, user_id, "encoding user data failed");
            not_saved()
        })?;
        self.store.put(&child_path(USERS, user_id), &doc).await.map_err(|e| {
            error!(error = %e, user_id, "saving user data failed");
            not_saved()
        })
    }

    // =========================================================================
    // SESSION SIGNALS
    // =========================================================================

    /// True while a session with a non-empty token is installed.
    #[must_use]
    pub fn is_user_authenticated(&self) -> SessionView<bool> {
        self.session.view(session::authenticated)
    }

    #[must_use]
    pub fn user_id(&self) -> SessionView<Option<String>> {
        self.session.view(session::user_id)
    }

    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        self.session.current()
    }

    #[must_use]
    pub fn is_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    // =========================================================================
    // PROFILES
    // =========================================================================

    /// Fetch the profile stored for `user_id`.
    ///
    /// # Errors
    ///
    /// - [`FacadeError::NotFound`] if nothing is stored for the id.
    /// - [`FacadeError::FetchFailed`] on any store or decode failure.
    pub async fn get_user_data(&self, user_id: &str) -> Result<UserData, FacadeError> {
        let doc = match self.store.get(&child_path(USERS, user_id)).await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                warn!(user_id, "user data not found");
                return Err(FacadeError::NotFound);
            }
            Err(e) => {
                error!(error = %e, user_id, "fetching user data failed");
                return Err(FacadeError::FetchFailed);
            }
        };

        serde_json::from_value(doc).map_err(|e| {
            error!(error = %e, user_id, "decoding user data failed");
            FacadeError::FetchFailed
        })
    }

    // =========================================================================
    // ADMIN APPROVAL QUEUE
    // =========================================================================

    /// Queue an admin registration for approval. Returns the store-assigned key.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::SaveFailed`] on any store failure.
    pub async fn save_admin_data(&self, profile: &UserData) -> Result<String, FacadeError> {
        let doc = serde_json::to_value(profile).map_err(|e| {
            error!(error = %e, "encoding admin data failed");
            FacadeError::SaveFailed
        })?;
        let key = self.store.post(ADMINS_TO_APPROVE, &doc).await.map_err(|e| {
            error!(error = %e, email = %profile.email, "saving admin data failed");
            FacadeError::SaveFailed
        })?;
        info!(%key, email = %profile.email, "admin request queued");
        Ok(key)
    }

    /// Remove a pending admin request.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::DeleteFailed`] on any store failure.
    pub async fn delete_admin_data(&self, admin_id: &str) -> Result<(), FacadeError> {
        self.store
            .delete(&child_path(ADMINS_TO_APPROVE, admin_id))
            .await
            .map_err(|e| {
                error!(error = %e, admin_id, "deleting admin data failed");
                FacadeError::DeleteFailed
            })?;
        info!(admin_id, "admin request removed");
        Ok(())
    }

    /// Every pending admin request, exactly as the store returns it
    /// (`Value::Null` when the queue is empty).
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::FetchFailed`] on any store failure.
    pub async fn get_admins_to_approve(&self) -> Result<Value, FacadeError> {
        match self.store.get(ADMINS_TO_APPROVE).await {
            Ok(listing) => Ok(listing.unwrap_or(Value::Null)),
            Err(e) => {
                error!(error = %e, "fetching admin requests failed");
                Err(FacadeError::FetchFailed)
            }
        }
    }

    // =========================================================================
    // ADMIN REQUEST COUNTER
    // =========================================================================

    /// Set the badge counter. Subscribers are notified even if the value is unchanged.
    pub fn set_admin_request_count(&self, count: u32) {
        self.admin_requests.send_replace(count);
    }

    #[must_use]
    pub fn admin_request_count(&self) -> watch::Receiver<u32> {
        self.admin_requests.subscribe()
    }

    /// List the approval queue and set the counter to its size.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::FetchFailed`] if the queue cannot be listed; the
    /// counter is left unchanged.
    pub async fn sync_admin_request_count(&self) -> Result<u32, FacadeError> {
        let listing = self.get_admins_to_approve().await?;
        let count = pending_count(&listing);
        self.set_admin_request_count(count);
        Ok(count)
    }

    // =========================================================================
    // SIGN-OUT
    // =========================================================================

    /// Clear the session after the configured delay, then navigate to the
    /// login route. Each call schedules its own timer.
    ///
    /// The ticket is taken now, so a sign-in issued during the delay outlives
    /// this sign-out; the timer then only resets the loading flag.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn sign_out(&self, mode: SignOutMode) -> JoinHandle<()> {
        if mode == SignOutMode::WithLoading {
            self.loading.send_replace(true);
        }

        let ticket = self.session.begin();
        let facade = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(facade.sign_out_delay).await;
            let cleared = facade.session.commit(ticket, None);
            if mode == SignOutMode::WithLoading {
                facade.loading.send_replace(false);
            }
            if !cleared {
                info!(?mode, "sign-out superseded by a newer sign-in");
                return;
            }
            info!(?mode, "signed out");
            facade.navigator.navigate(LOGIN_ROUTE);
        })
    }

    /// Sign out with the loading flag raised for the duration of the delay.
    pub fn log_out(&self) -> JoinHandle<()> {
        self.sign_out(SignOutMode::WithLoading)
    }

    /// Sign out without touching the loading flag.
    pub fn log_out_popover(&self) -> JoinHandle<()> {
        self.sign_out(SignOutMode::Quiet)
    }
}

/// Number of entries in an approval-queue listing.
fn pending_count(listing: &Value) -> u32 {
    let n = match listing {
        Value::Object(entries) => entries.len(),
        Value::Array(entries) => entries.iter().filter(|e| !e.is_null()).count(),
        _ => 0,
    };
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[path = "facade_test.rs"]
mod tests;
