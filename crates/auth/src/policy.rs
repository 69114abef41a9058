use thiserror::Error;

use apotheca_core::DomainError;

use crate::permissions::{
    Permission, BATCHES_MANAGE, BATCHES_VIEW, INVENTORY_MANAGE, INVENTORY_VIEW,
    MEDICATIONS_MANAGE, MEDICATIONS_VIEW, REPORTS_VIEW, USERS_MANAGE,
};
use crate::principal::Principal;
use crate::roles::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

impl From<AuthzError> for DomainError {
    fn from(_: AuthzError) -> Self {
        DomainError::Unauthorized
    }
}

/// Fixed role → permission table.
///
/// Unknown roles resolve to the empty set.
pub fn permissions_for_role(role: &Role) -> Vec<Permission> {
    let names: &[&'static str] = match role.as_str() {
        "admin" => &[
            USERS_MANAGE,
            MEDICATIONS_MANAGE,
            BATCHES_MANAGE,
            INVENTORY_MANAGE,
            REPORTS_VIEW,
        ],
        "pharmacist" => &[
            MEDICATIONS_MANAGE,
            BATCHES_MANAGE,
            INVENTORY_MANAGE,
            REPORTS_VIEW,
        ],
        "assistant" => &[MEDICATIONS_VIEW, BATCHES_VIEW, INVENTORY_VIEW],
        _ => &[],
    };
    names.iter().map(|n| Permission::new(*n)).collect()
}

/// Membership test with the super-admin override.
///
/// Admins satisfy every check, including permission strings the policy table
/// has never heard of.
pub fn has_permission(principal: &Principal, required: &Permission) -> bool {
    principal.role.is_admin()
        || principal
            .permissions
            .iter()
            .any(|p| p.as_str() == required.as_str())
}

/// Authorize a principal for one capability.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if has_permission(principal, required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Convenience for gating store operations on a well-known permission string.
pub fn require(principal: &Principal, permission: &'static str) -> Result<(), DomainError> {
    authorize(principal, &Permission::new(permission)).map_err(DomainError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Principal {
        Principal::from_role("renato", Role::new("admin"))
    }

    fn pharmacist() -> Principal {
        Principal::from_role("maria", Role::new("pharmacist"))
    }

    fn assistant() -> Principal {
        Principal::from_role("carlos", Role::new("assistant"))
    }

    #[test]
    fn admin_satisfies_any_permission_including_unknown_ones() {
        let p = admin();
        for name in ["users.manage", "inventory.manage", "totally.made.up"] {
            assert!(has_permission(&p, &Permission::new(name)));
        }
    }

    #[test]
    fn pharmacist_cannot_manage_users() {
        let p = pharmacist();
        assert!(has_permission(&p, &Permission::new(BATCHES_MANAGE)));
        assert!(!has_permission(&p, &Permission::new(USERS_MANAGE)));
    }

    #[test]
    fn assistant_is_view_only() {
        let p = assistant();
        assert!(has_permission(&p, &Permission::new(BATCHES_VIEW)));
        assert!(!has_permission(&p, &Permission::new(BATCHES_MANAGE)));
        assert!(!has_permission(&p, &Permission::new(INVENTORY_MANAGE)));
    }

    #[test]
    fn unknown_role_resolves_to_empty_set() {
        let role = Role::new("intern");
        assert!(permissions_for_role(&role).is_empty());

        let p = Principal::from_role("nobody", role);
        assert!(!has_permission(&p, &Permission::new(MEDICATIONS_VIEW)));
    }

    #[test]
    fn authorize_reports_the_missing_permission() {
        let err = authorize(&assistant(), &Permission::new(USERS_MANAGE)).unwrap_err();
        assert_eq!(err, AuthzError::Forbidden("users.manage".to_string()));
    }
}
