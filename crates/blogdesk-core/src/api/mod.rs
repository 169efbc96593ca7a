//! REST API client module for the blog server's authentication endpoints.
//!
//! This module provides the `AuthBackend` seam the session manager talks
//! to, and `ApiClient`, its HTTP implementation over `reqwest`.
//!
//! The server issues JWT bearer tokens from `POST /auth/login` and
//! `POST /auth/register`; attaching them to resource requests is left to
//! the resource wrappers (see `SessionManager::authorization_header`).

pub mod backend;
pub mod client;
pub mod error;

pub use backend::AuthBackend;
pub use client::ApiClient;
pub use error::ApiError;
