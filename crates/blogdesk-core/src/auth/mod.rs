//! Authentication module: session state, its persistence, and the access
//! decisions built on it.
//!
//! This module provides:
//! - `SessionManager`: owns the session and its login/register/logout transitions
//! - `CredentialStore`: durable key-value persistence (keyring, file or memory)
//! - `gate`: route protection driven by the session snapshot
//! - `policy`: owner-or-admin checks for edit/delete controls
//!
//! Sessions are restored from the credential store once at startup and
//! persist until logout; tokens are not refreshed.

pub mod credentials;
pub mod error;
pub mod gate;
pub mod manager;
pub mod policy;
pub mod session;

pub use credentials::{open_store, CredentialStore, FileStore, KeyringStore, MemoryStore};
pub use error::{AuthError, AuthErrorKind};
pub use gate::{can_enter, navigate, GateDecision, Navigation, Route};
pub use manager::SessionManager;
pub use policy::{can_mutate, Action, OwnershipRef};
pub use session::{SessionData, SessionSnapshot, SessionState, SessionWatcher};
