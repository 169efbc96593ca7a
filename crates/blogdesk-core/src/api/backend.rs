use async_trait::async_trait;

use crate::auth::AuthError;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};

/// Remote authentication service.
///
/// Implementations report every failure as an `AuthError`; the session
/// manager never sees transport-specific error types.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AuthError>;

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AuthError>;
}
