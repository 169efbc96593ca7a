//! Data models shared by the session core and the remote API client.
//!
//! - `UserProfile`: the cached identity of the signed-in user
//! - `LoginRequest`, `RegisterRequest`: bodies for the auth endpoints
//! - `AuthResponse`: the token + profile payload both endpoints return

pub mod auth;
pub mod user;

pub use auth::{AuthResponse, ErrorBody, LoginRequest, RegisterRequest};
pub use user::{UserProfile, ADMIN_ROLE};
