//! User accounts managed from the settings screen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use apotheca_core::{DomainError, DomainResult, Entity, UserId};

use crate::permissions::Permission;
use crate::principal::Principal;
use crate::roles::Role;

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
}

impl AccountStatus {
    pub fn toggled(self) -> Self {
        match self {
            AccountStatus::Active => AccountStatus::Inactive,
            AccountStatus::Inactive => AccountStatus::Active,
        }
    }
}

impl core::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "active"),
            AccountStatus::Inactive => write!(f, "inactive"),
        }
    }
}

/// A user account in the directory.
///
/// `permissions` is the explicitly granted set; admins pass every check
/// regardless of it (see the policy module).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub permissions: Vec<Permission>,
    pub status: AccountStatus,
    pub last_login: Option<DateTime<Utc>>,
}

/// Input for account creation.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub permissions: Vec<Permission>,
}

/// Replacement values for the mutable account fields.
#[derive(Debug, Clone)]
pub struct AccountPatch {
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub permissions: Vec<Permission>,
    pub status: AccountStatus,
}

impl Account {
    pub fn create(id: UserId, input: NewAccount) -> DomainResult<Self> {
        if input.username.trim().is_empty() {
            return Err(DomainError::validation("username cannot be empty"));
        }
        if input.full_name.trim().is_empty() {
            return Err(DomainError::validation("full name cannot be empty"));
        }
        if input.email.trim().is_empty() || !input.email.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }

        Ok(Self {
            id,
            username: input.username.trim().to_string(),
            full_name: input.full_name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            role: input.role,
            permissions: input.permissions,
            status: AccountStatus::Active,
            last_login: None,
        })
    }

    /// Apply a patch; the username and login history are not editable.
    pub fn apply_patch(&self, patch: AccountPatch) -> DomainResult<Self> {
        if patch.full_name.trim().is_empty() {
            return Err(DomainError::validation("full name cannot be empty"));
        }
        if patch.email.trim().is_empty() || !patch.email.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }

        Ok(Self {
            full_name: patch.full_name.trim().to_string(),
            email: patch.email.trim().to_lowercase(),
            role: patch.role,
            permissions: patch.permissions,
            status: patch.status,
            ..self.clone()
        })
    }

    /// Whether `principal` is this account's owner.
    ///
    /// Self-deletion and self-deactivation are forbidden by policy; the store
    /// uses this to decide.
    pub fn is_owned_by(&self, principal: &Principal) -> bool {
        self.username == principal.username
    }

    pub fn principal(&self) -> Principal {
        Principal::new(
            self.username.clone(),
            self.role.clone(),
            self.permissions.clone(),
        )
    }
}

impl Entity for Account {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account() -> NewAccount {
        NewAccount {
            username: "maria".to_string(),
            full_name: "Maria Oliveira".to_string(),
            email: "Maria@Example.com".to_string(),
            role: Role::new("pharmacist"),
            permissions: vec![],
        }
    }

    #[test]
    fn create_normalizes_email_and_trims_names() {
        let account = Account::create(UserId::new(), new_account()).unwrap();
        assert_eq!(account.email, "maria@example.com");
        assert_eq!(account.status, AccountStatus::Active);
        assert!(account.last_login.is_none());
    }

    #[test]
    fn create_rejects_blank_username() {
        let input = NewAccount {
            username: "   ".to_string(),
            ..new_account()
        };
        let err = Account::create(UserId::new(), input).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn create_rejects_malformed_email() {
        let input = NewAccount {
            email: "not-an-email".to_string(),
            ..new_account()
        };
        let err = Account::create(UserId::new(), input).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn patch_keeps_username_and_login_history() {
        let account = Account::create(UserId::new(), new_account()).unwrap();
        let patched = account
            .apply_patch(AccountPatch {
                full_name: "Maria O. Silva".to_string(),
                email: "maria@pharmacy.example".to_string(),
                role: Role::new("admin"),
                permissions: vec![],
                status: AccountStatus::Inactive,
            })
            .unwrap();

        assert_eq!(patched.username, "maria");
        assert_eq!(patched.full_name, "Maria O. Silva");
        assert_eq!(patched.status, AccountStatus::Inactive);
    }

    #[test]
    fn ownership_is_by_username() {
        let account = Account::create(UserId::new(), new_account()).unwrap();
        assert!(account.is_owned_by(&account.principal()));
        assert!(!account.is_owned_by(&Principal::from_role("renato", Role::new("admin"))));
    }
}
