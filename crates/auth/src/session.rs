//! Seam for the external authentication collaborator.
//!
//! The real service takes `{email, password}` and hands back a session
//! principal; the core only ever consumes the resolved
//! `{username, role, permissions}` triple.

use apotheca_core::{DomainError, DomainResult};

use crate::account::{Account, AccountStatus};
use crate::policy::permissions_for_role;
use crate::principal::Principal;

/// Login credentials as accepted by the authentication collaborator.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Authentication boundary.
pub trait SessionProvider {
    /// Exchange credentials for a resolved principal.
    ///
    /// Failures are reported as validation errors; nothing here is fatal.
    fn authenticate(&self, credentials: &Credentials) -> DomainResult<Principal>;
}

/// Directory-backed session provider.
///
/// Resolves profiles by email against a snapshot of the account directory and
/// derives permissions from the role table. Intended for tests/dev; password
/// verification belongs to the external service.
#[derive(Debug, Clone)]
pub struct DirectorySession {
    accounts: Vec<Account>,
}

impl DirectorySession {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }
}

impl SessionProvider for DirectorySession {
    fn authenticate(&self, credentials: &Credentials) -> DomainResult<Principal> {
        if credentials.password.is_empty() {
            return Err(DomainError::validation("password cannot be empty"));
        }

        let email = credentials.email.trim().to_lowercase();
        let account = self
            .accounts
            .iter()
            .find(|a| a.email == email)
            .ok_or_else(|| DomainError::validation("no profile found for this email"))?;

        if account.status == AccountStatus::Inactive {
            return Err(DomainError::validation("account is inactive"));
        }

        Ok(Principal::new(
            account.username.clone(),
            account.role.clone(),
            permissions_for_role(&account.role),
        ))
    }
}
