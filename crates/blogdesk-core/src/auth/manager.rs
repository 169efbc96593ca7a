//! Owner of the process-wide session.
//!
//! All session mutation goes through `initialize`, `login`/`register` and
//! `logout`. State is published through a `watch` channel: each change is
//! written to the credential store and then swapped in as a whole, inside
//! the channel's write lock, so no observer ever sees a token without its
//! profile or in-memory state that is not yet durable.
//!
//! Store writes are blocking (keychain or file I/O) and run on the calling
//! task while that lock is held. They are short, and readers only ever take
//! the lock to clone a snapshot.

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::AuthBackend;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, UserProfile};

use super::credentials::{self, CredentialStore};
use super::{AuthError, SessionData, SessionSnapshot, SessionState, SessionWatcher};

pub struct SessionManager {
    store: Box<dyn CredentialStore>,
    backend: Box<dyn AuthBackend>,
    state: watch::Sender<SessionState>,
}

impl SessionManager {
    /// Create a manager in the `Restoring` state. Call `initialize` next.
    pub fn new(store: Box<dyn CredentialStore>, backend: Box<dyn AuthBackend>) -> Self {
        let (state, _) = watch::channel(SessionState::Restoring);
        Self {
            store,
            backend,
            state,
        }
    }

    /// Restore the persisted session, once.
    ///
    /// Later calls, or calls after a login already completed, leave the
    /// state alone. A missing, partial or corrupt record means signed out.
    pub fn initialize(&self) -> SessionSnapshot {
        if !self.state.borrow().is_restoring() {
            debug!("Session already initialized");
            return self.snapshot();
        }

        let restored = credentials::load_record(self.store.as_ref());
        self.state.send_if_modified(|state| {
            if !state.is_restoring() {
                return false;
            }
            *state = match restored {
                Some(data) => {
                    info!(username = %data.user.username, "Restored saved session");
                    SessionState::Authenticated(data)
                }
                None => {
                    debug!("No saved session");
                    SessionState::Anonymous
                }
            };
            true
        });
        self.snapshot()
    }

    /// Sign in with username and password.
    ///
    /// On failure the session is exactly as it was before the call.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile, AuthError> {
        require_fields(&[username], password)?;
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        info!(username = %username, "Signing in");
        let response = self.backend.login(&request).await.map_err(|e| {
            warn!(username = %username, error = %e, "Login failed");
            e
        })?;
        self.establish(response)
    }

    /// Create an account and sign in with the token the server returns.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, AuthError> {
        require_fields(&[username, email], password)?;
        let request = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };

        info!(username = %username, "Registering account");
        let response = self.backend.register(&request).await.map_err(|e| {
            warn!(username = %username, error = %e, "Registration failed");
            e
        })?;
        self.establish(response)
    }

    /// Sign out. Clears the store and publishes `Anonymous`; never fails.
    pub fn logout(&self) {
        self.state.send_if_modified(|state| {
            if let Err(e) = credentials::clear_record(self.store.as_ref()) {
                warn!(error = %e, "Failed to clear stored credentials");
            }
            if matches!(state, SessionState::Anonymous) {
                return false;
            }
            info!("Signed out");
            *state = SessionState::Anonymous;
            true
        });
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(&*self.state.borrow())
    }

    pub fn subscribe(&self) -> SessionWatcher {
        SessionWatcher::new(self.state.subscribe())
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.state.borrow().user().cloned()
    }

    /// Get the bearer token if signed in
    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_string)
    }

    /// `Authorization` header value for resource requests
    pub fn authorization_header(&self) -> Option<String> {
        self.token().map(|token| format!("Bearer {}", token))
    }

    /// Persist and publish a successful auth response.
    fn establish(&self, response: AuthResponse) -> Result<UserProfile, AuthError> {
        let (token, user) = response.into_parts();
        let token = token.filter(|t| !t.is_empty()).ok_or_else(|| {
            warn!(username = %user.username, "Auth response did not include a token");
            AuthError::InvalidResponse("response did not include a session token".to_string())
        })?;
        let data = SessionData { token, user };

        let mut outcome = Ok(());
        self.state.send_if_modified(|state| {
            match credentials::save_record(self.store.as_ref(), &data) {
                Ok(()) => {
                    *state = SessionState::Authenticated(data.clone());
                    true
                }
                Err(e) => {
                    warn!(error = %e, "Failed to persist session");
                    outcome = Err(AuthError::Storage(e.to_string()));
                    false
                }
            }
        });
        outcome?;

        info!(username = %data.user.username, "Signed in");
        Ok(data.user)
    }
}

/// Reject blank required fields before anything goes over the wire.
///
/// Text fields are blank when only whitespace; the password only when empty.
fn require_fields(fields: &[&str], password: &str) -> Result<(), AuthError> {
    if password.is_empty() || fields.iter().any(|f| f.trim().is_empty()) {
        return Err(AuthError::missing_fields());
    }
    Ok(())
}
