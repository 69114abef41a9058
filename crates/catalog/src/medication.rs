use serde::{Deserialize, Serialize};
use uuid::Uuid;

use apotheca_core::{DomainError, DomainResult, Entity};

/// Medication identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MedicationId(Uuid);

impl MedicationId {
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

impl Default for MedicationId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for MedicationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A medication in the catalog.
///
/// `reorder_level` is an advisory restock threshold; nothing enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub id: MedicationId,
    pub code: String,
    pub name: String,
    pub category: String,
    pub supplier: String,
    pub reorder_level: u32,
}

/// Input for catalog entry creation.
#[derive(Debug, Clone)]
pub struct NewMedication {
    pub code: String,
    pub name: String,
    pub category: String,
    pub supplier: String,
    pub reorder_level: u32,
}

/// Replacement values for an explicit edit.
#[derive(Debug, Clone)]
pub struct MedicationPatch {
    pub code: String,
    pub name: String,
    pub category: String,
    pub supplier: String,
    pub reorder_level: u32,
}

impl Medication {
    pub fn create(id: MedicationId, input: NewMedication) -> DomainResult<Self> {
        validate(&input.code, &input.name, &input.category)?;
        Ok(Self {
            id,
            code: input.code.trim().to_string(),
            name: input.name.trim().to_string(),
            category: input.category.trim().to_string(),
            supplier: input.supplier.trim().to_string(),
            reorder_level: input.reorder_level,
        })
    }

    pub fn apply_patch(&self, patch: MedicationPatch) -> DomainResult<Self> {
        validate(&patch.code, &patch.name, &patch.category)?;
        Ok(Self {
            id: self.id,
            code: patch.code.trim().to_string(),
            name: patch.name.trim().to_string(),
            category: patch.category.trim().to_string(),
            supplier: patch.supplier.trim().to_string(),
            reorder_level: patch.reorder_level,
        })
    }
}

fn validate(code: &str, name: &str, category: &str) -> DomainResult<()> {
    if code.trim().is_empty() {
        return Err(DomainError::validation("code cannot be empty"));
    }
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    if category.trim().is_empty() {
        return Err(DomainError::validation("category cannot be empty"));
    }
    Ok(())
}

impl Entity for Medication {
    type Id = MedicationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
