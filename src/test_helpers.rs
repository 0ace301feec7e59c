//! In-memory doubles for the provider seams, shared by unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Map, Value};

use crate::facade::AuthFacade;
use crate::identity::{AuthResponse, IdentityError, IdentityProvider};
use crate::navigation::Navigator;
use crate::profile::Credentials;
use crate::store::{DocumentStore, StoreError};

pub const SIGN_OUT_DELAY: Duration = Duration::from_secs(1);

// =============================================================================
// MockIdentity
// =============================================================================

struct MockAccount {
    local_id: String,
    password: String,
}

/// Scripted identity provider. Accounts live in memory; per-email delays let
/// tests control the order in which responses arrive.
#[derive(Default)]
pub struct MockIdentity {
    accounts: Mutex<HashMap<String, MockAccount>>,
    delays: Mutex<HashMap<String, Duration>>,
    next_id: AtomicUsize,
    expires_in: Mutex<Option<String>>,
}

impl MockIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_account(self, email: &str, password: &str, local_id: &str) -> Self {
        self.accounts.lock().unwrap().insert(
            email.to_owned(),
            MockAccount { local_id: local_id.to_owned(), password: password.to_owned() },
        );
        self
    }

    /// Delay every response for `email` by `delay`.
    #[must_use]
    pub fn with_delay(self, email: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(email.to_owned(), delay);
        self
    }

    /// Override the `expiresIn` value returned on success.
    #[must_use]
    pub fn with_expires_in(self, raw: &str) -> Self {
        *self.expires_in.lock().unwrap() = Some(raw.to_owned());
        self
    }

    fn response(&self, email: &str, local_id: &str, registered: Option<bool>) -> AuthResponse {
        let expires_in = self.expires_in.lock().unwrap().clone().unwrap_or_else(|| "3600".into());
        AuthResponse {
            kind: "identitytoolkit#mock".into(),
            id_token: format!("token-{local_id}"),
            email: email.to_owned(),
            refresh_token: format!("refresh-{local_id}"),
            local_id: local_id.to_owned(),
            expires_in,
            registered,
        }
    }

    async fn delay_for(&self, email: &str) {
        let delay = self.delays.lock().unwrap().get(email).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn rejected(code: &str) -> IdentityError {
    IdentityError::Rejected { status: 400, code: code.into(), message: String::new() }
}

#[async_trait::async_trait]
impl IdentityProvider for MockIdentity {
    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthResponse, IdentityError> {
        self.delay_for(&credentials.email).await;
        let local_id = {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.contains_key(&credentials.email) {
                return Err(rejected("EMAIL_EXISTS"));
            }
            let local_id = format!("uid-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
            accounts.insert(
                credentials.email.clone(),
                MockAccount { local_id: local_id.clone(), password: credentials.password.clone() },
            );
            local_id
        };
        Ok(self.response(&credentials.email, &local_id, None))
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthResponse, IdentityError> {
        self.delay_for(&credentials.email).await;
        let local_id = {
            let accounts = self.accounts.lock().unwrap();
            let account = accounts
                .get(&credentials.email)
                .ok_or_else(|| rejected("EMAIL_NOT_FOUND"))?;
            if account.password != credentials.password {
                return Err(rejected("INVALID_PASSWORD"));
            }
            account.local_id.clone()
        };
        Ok(self.response(&credentials.email, &local_id, Some(true)))
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// Flat path → document map that reads collections back as objects keyed by
/// child id, the way the realtime database does.
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<BTreeMap<String, Value>>,
    next_key: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with a permission error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn insert(&self, path: &str, value: Value) {
        self.docs.lock().unwrap().insert(path.to_owned(), value);
    }

    #[must_use]
    pub fn raw(&self, path: &str) -> Option<Value> {
        self.docs.lock().unwrap().get(path).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Status { status: 401, body: r#"{"error":"Permission denied"}"#.into() });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        self.check()?;
        let docs = self.docs.lock().unwrap();
        if let Some(doc) = docs.get(path) {
            return Ok(Some(doc.clone()));
        }
        let prefix = format!("{path}/");
        let children: Map<String, Value> = docs
            .iter()
            .filter_map(|(key, doc)| {
                let child = key.strip_prefix(&prefix)?;
                (!child.contains('/')).then(|| (child.to_owned(), doc.clone()))
            })
            .collect();
        Ok(if children.is_empty() { None } else { Some(Value::Object(children)) })
    }

    async fn put(&self, path: &str, value: &Value) -> Result<(), StoreError> {
        self.check()?;
        self.insert(path, value.clone());
        Ok(())
    }

    async fn post(&self, path: &str, value: &Value) -> Result<String, StoreError> {
        self.check()?;
        let key = format!("-K{:04}", self.next_key.fetch_add(1, Ordering::SeqCst));
        self.insert(&format!("{path}/{key}"), value.clone());
        Ok(key)
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.check()?;
        match self.docs.lock().unwrap().remove(path) {
            Some(_) => Ok(()),
            None => Err(StoreError::Status { status: 404, body: "null".into() }),
        }
    }
}

// =============================================================================
// RecordingNavigator
// =============================================================================

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_owned());
    }
}

// =============================================================================
// Facade fixture
// =============================================================================

pub struct Fixture {
    pub facade: AuthFacade,
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<RecordingNavigator>,
}

#[must_use]
pub fn fixture(identity: MockIdentity) -> Fixture {
    let identity = Arc::new(identity);
    let store = Arc::new(MemoryStore::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let facade = AuthFacade::new(identity, store.clone(), navigator.clone(), SIGN_OUT_DELAY);
    Fixture { facade, store, navigator }
}
