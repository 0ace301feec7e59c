//! Current-session state and its reactive views.
//!
//! DESIGN
//! ======
//! `SessionStore` owns exactly one `Option<Session>` inside a
//! `tokio::sync::watch` channel, so any number of UI surfaces can observe it
//! without polling. `SessionView<T>` is a receiver plus a projection, used for
//! the derived `is_user_authenticated` / `user_id` signals.
//!
//! ORDERING
//! ========
//! Every session-changing operation takes a ticket from `begin()` when it is
//! issued and presents it to `commit()` when its result is ready. A commit is
//! applied only if its ticket is newer than the last applied one, so the most
//! recently issued sign-in (or sign-out) wins even if an older response lands
//! later. The compare-and-publish runs under a mutex so it is atomic across
//! worker threads.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::debug;

use crate::error::FacadeError;
use crate::identity::AuthResponse;

// =============================================================================
// SESSION
// =============================================================================

/// The currently authenticated principal.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    user_id: String,
    email: String,
    token: String,
    expires_at: OffsetDateTime,
}

impl Session {
    #[must_use]
    pub fn new(user_id: String, email: String, token: String, expires_at: OffsetDateTime) -> Self {
        Self { user_id, email, token, expires_at }
    }

    /// Build a session from a sign-up / sign-in response received at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::InvalidExpiry`] if `expiresIn` is not a positive
    /// whole number of seconds or the resulting instant is out of range.
    pub fn from_auth_response(resp: &AuthResponse, now: OffsetDateTime) -> Result<Self, FacadeError> {
        let lifetime: i64 = resp
            .expires_in
            .trim()
            .parse()
            .map_err(|_| FacadeError::InvalidExpiry(resp.expires_in.clone()))?;
        if lifetime <= 0 {
            return Err(FacadeError::InvalidExpiry(resp.expires_in.clone()));
        }
        let expires_at = now
            .checked_add(time::Duration::seconds(lifetime))
            .ok_or_else(|| FacadeError::InvalidExpiry(resp.expires_in.clone()))?;
        Ok(Self::new(resp.local_id.clone(), resp.email.clone(), resp.id_token.clone(), expires_at))
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Opaque bearer token issued by the identity provider.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        self.expires_at
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    /// Pure query; nothing in the crate acts on expiry.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

// =============================================================================
// SESSION STORE
// =============================================================================

pub struct SessionStore {
    tx: watch::Sender<Option<Session>>,
    issued: AtomicU64,
    applied: Mutex<u64>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx, issued: AtomicU64::new(0), applied: Mutex::new(0) }
    }

    /// Take the next ticket. Call when a session-changing operation is issued.
    pub fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publish `session` if `ticket` is newer than the last applied commit.
    /// Returns `false` when the commit was stale and dropped.
    pub fn commit(&self, ticket: u64, session: Option<Session>) -> bool {
        let mut applied = self.applied.lock().unwrap_or_else(PoisonError::into_inner);
        if ticket <= *applied {
            debug!(ticket, applied = *applied, "stale session commit dropped");
            return false;
        }
        *applied = ticket;
        self.tx.send_replace(session);
        true
    }

    /// Clear the session, superseding every operation issued before this call.
    pub fn clear(&self) -> bool {
        let ticket = self.begin();
        self.commit(ticket, None)
    }

    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn view<T>(&self, project: fn(Option<&Session>) -> T) -> SessionView<T> {
        SessionView { rx: self.subscribe(), project }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SESSION VIEW
// =============================================================================

/// A projected, observable view of the current session.
pub struct SessionView<T> {
    rx: watch::Receiver<Option<Session>>,
    project: fn(Option<&Session>) -> T,
}

impl<T> SessionView<T> {
    /// Projected value for the session as it is right now.
    #[must_use]
    pub fn get(&self) -> T {
        (self.project)(self.rx.borrow().as_ref())
    }

    /// Wait for the next session change and return the projected value.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::Closed`] once the owning store has been dropped.
    pub async fn changed(&mut self) -> Result<T, FacadeError> {
        self.rx.changed().await.map_err(|_| FacadeError::Closed)?;
        Ok((self.project)(self.rx.borrow_and_update().as_ref()))
    }
}

impl<T> Clone for SessionView<T> {
    fn clone(&self) -> Self {
        Self { rx: self.rx.clone(), project: self.project }
    }
}

/// True iff a session is present and carries a non-empty token.
pub(crate) fn authenticated(session: Option<&Session>) -> bool {
    session.is_some_and(Session::has_token)
}

pub(crate) fn user_id(session: Option<&Session>) -> Option<String> {
    session.map(|s| s.user_id.clone())
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
