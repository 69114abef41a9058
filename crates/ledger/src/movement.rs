//! Journal rows: one recorded stock change against a batch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use apotheca_catalog::{MedicationId, ReasonId};

use crate::batch::BatchId;

/// Movement identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementId(Uuid);

impl MovementId {
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

impl Default for MovementId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for MovementId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// What kind of journal entry this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    In,
    Out,
    /// Manual reconciliation entry; the only sanctioned correction path.
    Adjustment,
}

impl core::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MovementKind::In => write!(f, "in"),
            MovementKind::Out => write!(f, "out"),
            MovementKind::Adjustment => write!(f, "adjustment"),
        }
    }
}

/// Requested stock change, validated by the batch aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockChange {
    /// Stock received into the batch.
    In { quantity: i64 },
    /// Stock dispensed from the batch.
    Out { quantity: i64 },
    /// Signed correction (e.g. count reconciliation).
    Adjustment { delta: i64 },
}

impl StockChange {
    pub fn kind(&self) -> MovementKind {
        match self {
            StockChange::In { .. } => MovementKind::In,
            StockChange::Out { .. } => MovementKind::Out,
            StockChange::Adjustment { .. } => MovementKind::Adjustment,
        }
    }

    /// Signed effect on the batch's current stock.
    pub fn delta(&self) -> i64 {
        match *self {
            StockChange::In { quantity } => quantity,
            StockChange::Out { quantity } => -quantity,
            StockChange::Adjustment { delta } => delta,
        }
    }
}

/// One immutable journal entry.
///
/// Append-only: there is no edit or delete operation for movements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub kind: MovementKind,
    pub medication_id: MedicationId,
    pub batch_id: BatchId,
    /// Signed stock effect (+in / -out / adjustment delta).
    pub delta: i64,
    pub date: NaiveDate,
    pub recorded_by: String,
    pub reason_id: Option<ReasonId>,
    pub notes: Option<String>,
}

impl Movement {
    /// Units moved, regardless of direction.
    pub fn quantity(&self) -> i64 {
        self.delta.abs()
    }
}
