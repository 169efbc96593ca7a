use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::models::UserProfile;

/// A bearer token together with the profile it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub user: UserProfile,
}

/// Lifecycle of the process-wide session.
///
/// `Restoring` only exists between construction and the first store read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Restoring,
    Anonymous,
    Authenticated(SessionData),
}

impl SessionState {
    pub fn is_restoring(&self) -> bool {
        matches!(self, SessionState::Restoring)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn data(&self) -> Option<&SessionData> {
        match self {
            SessionState::Authenticated(data) => Some(data),
            _ => None,
        }
    }

    /// Get the bearer token if signed in
    pub fn token(&self) -> Option<&str> {
        self.data().map(|d| d.token.as_str())
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.data().map(|d| &d.user)
    }
}

/// Read-only view of the session handed to UI consumers.
///
/// Built from a single `SessionState`, so `is_authenticated` always agrees
/// with the presence of `user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    user: Option<UserProfile>,
    is_authenticated: bool,
    loading: bool,
}

impl SessionSnapshot {
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

impl From<&SessionState> for SessionSnapshot {
    fn from(state: &SessionState) -> Self {
        let user = state.user().cloned();
        Self {
            is_authenticated: user.is_some(),
            user,
            loading: state.is_restoring(),
        }
    }
}

/// Subscription to session changes.
pub struct SessionWatcher {
    rx: watch::Receiver<SessionState>,
}

impl SessionWatcher {
    pub(crate) fn new(rx: watch::Receiver<SessionState>) -> Self {
        Self { rx }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(&*self.rx.borrow())
    }

    /// Wait for the next published change and return it.
    /// Returns `None` once the session manager has been dropped.
    pub async fn changed(&mut self) -> Option<SessionSnapshot> {
        self.rx.changed().await.ok()?;
        Some(SessionSnapshot::from(&*self.rx.borrow_and_update()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bob() -> SessionData {
        SessionData {
            token: "t1".to_string(),
            user: UserProfile {
                id: 1,
                username: "bob".to_string(),
                email: None,
                roles: Default::default(),
            },
        }
    }

    #[test]
    fn test_snapshot_restoring() {
        let snapshot = SessionSnapshot::from(&SessionState::Restoring);
        assert!(snapshot.is_loading());
        assert!(!snapshot.is_authenticated());
        assert!(snapshot.user().is_none());
    }

    #[test]
    fn test_snapshot_anonymous() {
        let snapshot = SessionSnapshot::from(&SessionState::Anonymous);
        assert!(!snapshot.is_loading());
        assert!(!snapshot.is_authenticated());
        assert!(snapshot.user().is_none());
    }

    #[test]
    fn test_snapshot_authenticated() {
        let state = SessionState::Authenticated(bob());
        let snapshot = SessionSnapshot::from(&state);
        assert!(!snapshot.is_loading());
        assert!(snapshot.is_authenticated());
        assert_eq!(snapshot.user().map(|u| u.id), Some(1));
        assert_eq!(state.token(), Some("t1"));
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let snapshot = SessionSnapshot::from(&SessionState::Anonymous);
        let value = serde_json::to_value(&snapshot).expect("Failed to serialize snapshot");
        assert_eq!(
            value,
            serde_json::json!({"user": null, "isAuthenticated": false, "loading": false})
        );
    }
}
