//! Roles, permissions, and the advisory access policy.
//!
//! Permission checks here gate mutation paths in the store. They are UI-grade
//! gating only and must be paired with equivalent enforcement at any real
//! service boundary.

pub mod account;
pub mod permissions;
pub mod policy;
pub mod principal;
pub mod roles;
pub mod session;

pub use account::{Account, AccountPatch, AccountStatus, NewAccount};
pub use permissions::Permission;
pub use policy::{authorize, has_permission, permissions_for_role, require, AuthzError};
pub use principal::Principal;
pub use roles::Role;
pub use session::{Credentials, DirectorySession, SessionProvider};
