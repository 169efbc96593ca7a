//! Edit/delete authorization for owned resources.
//!
//! Advisory only: it decides which controls to show. The server repeats the
//! same owner-or-admin check on every mutating request.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{UserProfile, ADMIN_ROLE};

/// Ownership metadata of a resource subject to edit authorization.
///
/// Deserializes from any resource payload carrying `authorId`, e.g. a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRef {
    #[serde(rename = "authorId")]
    pub author_id: i64,
    /// Roles that may mutate regardless of authorship
    #[serde(skip, default = "default_override_roles")]
    pub override_roles: BTreeSet<String>,
}

fn default_override_roles() -> BTreeSet<String> {
    BTreeSet::from([ADMIN_ROLE.to_string()])
}

impl OwnershipRef {
    pub fn new(author_id: i64) -> Self {
        Self {
            author_id,
            override_roles: default_override_roles(),
        }
    }
}

/// Mutating actions gated by ownership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Edit,
    Delete,
}

impl Action {
    /// Edit and delete share the owner-or-admin rule.
    pub fn permits(&self, user: Option<&UserProfile>, resource: &OwnershipRef) -> bool {
        match self {
            Action::Edit | Action::Delete => can_mutate(user, resource),
        }
    }
}

/// True iff a user is present and either authored the resource or holds an
/// override role.
pub fn can_mutate(user: Option<&UserProfile>, resource: &OwnershipRef) -> bool {
    let Some(user) = user else {
        return false;
    };
    user.id == resource.author_id
        || resource
            .override_roles
            .iter()
            .any(|role| user.has_role(role))
}
