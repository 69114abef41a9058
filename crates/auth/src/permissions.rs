use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Dot-namespaced capability token (e.g. "inventory.manage").
///
/// Permissions are modeled as opaque strings so the policy layer can evolve
/// the catalog without touching the type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

/// Permission strings known to the policy table.
pub const USERS_MANAGE: &str = "users.manage";
pub const MEDICATIONS_MANAGE: &str = "medications.manage";
pub const MEDICATIONS_VIEW: &str = "medications.view";
pub const BATCHES_MANAGE: &str = "batches.manage";
pub const BATCHES_VIEW: &str = "batches.view";
pub const INVENTORY_MANAGE: &str = "inventory.manage";
pub const INVENTORY_VIEW: &str = "inventory.view";
pub const REPORTS_VIEW: &str = "reports.view";

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
