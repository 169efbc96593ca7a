use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::UserProfile;

/// Body for `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body for `POST /auth/register`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Successful response from either auth endpoint.
///
/// The token is optional here because the server contract does not promise
/// it; the session manager refuses to establish a session without one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl AuthResponse {
    /// Split into the bearer token (if any) and the cacheable profile.
    pub fn into_parts(self) -> (Option<String>, UserProfile) {
        let user = UserProfile {
            id: self.id,
            username: self.username,
            email: self.email,
            roles: self.roles,
        };
        (self.token, user)
    }
}

/// Error payload the server sends with 4xx/5xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Extract a non-empty `message` from a raw response body, if any.
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auth_response() {
        let json = r#"{"token":"t1","id":1,"username":"bob","email":"bob@example.com","roles":["ROLE_USER"]}"#;
        let resp: AuthResponse = serde_json::from_str(json).expect("Failed to parse auth response");
        let (token, user) = resp.into_parts();
        assert_eq!(token.as_deref(), Some("t1"));
        assert_eq!(user.id, 1);
        assert_eq!(user.email.as_deref(), Some("bob@example.com"));
        assert!(user.has_role("ROLE_USER"));
    }

    #[test]
    fn test_parse_auth_response_without_token() {
        let json = r#"{"id":1,"username":"bob","email":"bob@example.com"}"#;
        let resp: AuthResponse = serde_json::from_str(json).expect("Failed to parse auth response");
        assert_eq!(resp.token, None);
        assert!(resp.roles.is_empty());
    }

    #[test]
    fn test_error_body_message() {
        assert_eq!(
            ErrorBody::message_from(r#"{"message":"Username is already taken!"}"#).as_deref(),
            Some("Username is already taken!")
        );
        assert_eq!(ErrorBody::message_from(r#"{"message":"  "}"#), None);
        assert_eq!(ErrorBody::message_from(r#"{"error":"nope"}"#), None);
        assert_eq!(ErrorBody::message_from(""), None);
        assert_eq!(ErrorBody::message_from("<html>Bad Gateway</html>"), None);
    }

    #[test]
    fn test_login_request_body() {
        let req = LoginRequest {
            username: "bob".to_string(),
            password: "secret".to_string(),
        };
        let value = serde_json::to_value(&req).expect("Failed to serialize request");
        assert_eq!(value, serde_json::json!({"username": "bob", "password": "secret"}));
    }
}
