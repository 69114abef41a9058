use serde::{Deserialize, Serialize};

use crate::permissions::Permission;
use crate::policy::permissions_for_role;
use crate::roles::Role;

/// A resolved principal for authorization decisions.
///
/// This is the `{username, role, permissions}` triple the core consumes from
/// the authentication collaborator; construction is decoupled from whatever
/// transport/storage produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub username: String,
    pub role: Role,
    pub permissions: Vec<Permission>,
}

impl Principal {
    pub fn new(
        username: impl Into<String>,
        role: Role,
        permissions: Vec<Permission>,
    ) -> Self {
        Self {
            username: username.into(),
            role,
            permissions,
        }
    }

    /// Build a principal whose permission set is derived from the role table.
    pub fn from_role(username: impl Into<String>, role: Role) -> Self {
        let permissions = permissions_for_role(&role);
        Self::new(username, role, permissions)
    }
}
