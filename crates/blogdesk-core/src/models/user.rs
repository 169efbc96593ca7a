use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Role granted to administrators; overrides ownership checks.
pub const ADMIN_ROLE: &str = "ROLE_ADMIN";

/// Profile of the signed-in user, as returned by the auth endpoints and
/// cached under the `user` credential key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl UserProfile {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }

    /// Display name for status lines
    pub fn display_name(&self) -> &str {
        &self.username
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profile_without_email() {
        let json = r#"{"id":1,"username":"bob","roles":["ROLE_USER"]}"#;
        let user: UserProfile = serde_json::from_str(json).expect("Failed to parse profile");
        assert_eq!(user.id, 1);
        assert_eq!(user.username, "bob");
        assert_eq!(user.email, None);
        assert!(user.has_role("ROLE_USER"));
        assert!(!user.is_admin());
    }

    #[test]
    fn test_parse_profile_missing_roles_defaults_empty() {
        let json = r#"{"id":7,"username":"eve","email":"eve@example.com"}"#;
        let user: UserProfile = serde_json::from_str(json).expect("Failed to parse profile");
        assert!(user.roles.is_empty());
        assert_eq!(user.email.as_deref(), Some("eve@example.com"));
    }

    #[test]
    fn test_serialized_profile_omits_absent_email() {
        let user = UserProfile {
            id: 1,
            username: "bob".to_string(),
            email: None,
            roles: BTreeSet::from(["ROLE_USER".to_string()]),
        };
        let json = serde_json::to_string(&user).expect("Failed to serialize profile");
        assert_eq!(json, r#"{"id":1,"username":"bob","roles":["ROLE_USER"]}"#);
    }
}
