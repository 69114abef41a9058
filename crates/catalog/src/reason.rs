use serde::{Deserialize, Serialize};
use uuid::Uuid;

use apotheca_core::{DomainError, DomainResult, Entity};

/// Reason identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReasonId(Uuid);

impl ReasonId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ReasonId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ReasonId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Why a stock movement happened (adjustment, return, loss, ...).
///
/// Movements reference reasons optionally; inactive reasons stay resolvable
/// for historical entries but are rejected on new ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    pub id: ReasonId,
    pub code: String,
    pub description: String,
    pub active: bool,
}

/// Input for reason creation.
#[derive(Debug, Clone)]
pub struct NewReason {
    pub code: String,
    pub description: String,
}

/// Replacement values for an explicit edit.
#[derive(Debug, Clone)]
pub struct ReasonPatch {
    pub code: String,
    pub description: String,
    pub active: bool,
}

impl Reason {
    pub fn create(id: ReasonId, input: NewReason) -> DomainResult<Self> {
        validate(&input.code, &input.description)?;
        Ok(Self {
            id,
            code: input.code.trim().to_uppercase(),
            description: input.description.trim().to_string(),
            active: true,
        })
    }

    pub fn apply_patch(&self, patch: ReasonPatch) -> DomainResult<Self> {
        validate(&patch.code, &patch.description)?;
        Ok(Self {
            id: self.id,
            code: patch.code.trim().to_uppercase(),
            description: patch.description.trim().to_string(),
            active: patch.active,
        })
    }
}

fn validate(code: &str, description: &str) -> DomainResult<()> {
    if code.trim().is_empty() {
        return Err(DomainError::validation("code cannot be empty"));
    }
    if description.trim().is_empty() {
        return Err(DomainError::validation("description cannot be empty"));
    }
    Ok(())
}

impl Entity for Reason {
    type Id = ReasonId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_upcases_code() {
        let reason = Reason::create(
            ReasonId::new(),
            NewReason {
                code: "adj".to_string(),
                description: "Stock adjustment".to_string(),
            },
        )
        .unwrap();
        assert_eq!(reason.code, "ADJ");
        assert!(reason.active);
    }

    #[test]
    fn create_rejects_blank_description() {
        let result = Reason::create(
            ReasonId::new(),
            NewReason {
                code: "DEV".to_string(),
                description: "".to_string(),
            },
        );
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn patch_can_deactivate() {
        let reason = Reason::create(
            ReasonId::new(),
            NewReason {
                code: "PER".to_string(),
                description: "Loss".to_string(),
            },
        )
        .unwrap();

        let edited = reason
            .apply_patch(ReasonPatch {
                code: reason.code.clone(),
                description: reason.description.clone(),
                active: false,
            })
            .unwrap();
        assert!(!edited.active);
    }
}
