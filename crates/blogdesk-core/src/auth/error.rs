use thiserror::Error;

/// Message shown when the server gave no usable explanation.
pub const GENERIC_FAILURE_MESSAGE: &str = "Invalid username or password";

/// Message shown when a required form field is blank.
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields";

/// Failure of a login or register call.
///
/// None of these leave the session in a different state than before the
/// call; callers render `user_message()` and may retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("Authentication rejected: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: Option<u16>,
        message: Option<String>,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to persist credentials: {0}")]
    Storage(String),
}

/// Coarse classification of an [`AuthError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum AuthErrorKind {
    Validation,
    Rejected,
    Transport,
    Storage,
}

impl AuthError {
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            AuthError::Validation(_) => AuthErrorKind::Validation,
            AuthError::Rejected { .. } => AuthErrorKind::Rejected,
            AuthError::Transport(_) | AuthError::InvalidResponse(_) => AuthErrorKind::Transport,
            AuthError::Storage(_) => AuthErrorKind::Storage,
        }
    }

    /// Text suitable for showing next to the login/register form.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Validation(message) => message.clone(),
            AuthError::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            AuthError::Rejected { message: None, .. }
            | AuthError::Transport(_)
            | AuthError::InvalidResponse(_) => GENERIC_FAILURE_MESSAGE.to_string(),
            AuthError::Storage(_) => "Could not save your session. Please try again.".to_string(),
        }
    }

    pub(crate) fn missing_fields() -> Self {
        AuthError::Validation(MISSING_FIELDS_MESSAGE.to_string())
    }
}
