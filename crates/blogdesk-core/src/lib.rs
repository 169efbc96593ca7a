//! Session and authorization core for the blogdesk content-management client.
//!
//! The pieces, leaves first:
//! - [`auth::CredentialStore`]: where the token and cached profile live between runs
//! - [`auth::SessionManager`]: the session state machine and its subscribers
//! - [`auth::gate`]: whether a navigation target may be entered
//! - [`auth::policy`]: whether the current user may edit or delete a resource
//! - [`api::ApiClient`]: the HTTP side of login and registration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, AuthBackend};
pub use auth::{AuthError, SessionManager, SessionSnapshot};
pub use config::Config;
