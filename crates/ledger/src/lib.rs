//! Stock ledger: batch lifecycle, the movement journal, and derived status.
//!
//! A `Batch` is one received lot of a medication. All stock changes flow
//! through recorded movements; there is no direct edit path for the remaining
//! quantity, so the journal stays the single source of truth.

pub mod batch;
pub mod code;
pub mod movement;
pub mod status;

pub use batch::{
    Amend, Batch, BatchCommand, BatchEvent, BatchId, BatchStatus, Receive, RecordMovement, Retire,
};
pub use code::batch_number;
pub use movement::{Movement, MovementId, MovementKind, StockChange};
pub use status::{expiry_risk, stock_level, ExpiryRisk, StockLevel};
