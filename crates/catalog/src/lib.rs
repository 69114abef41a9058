//! Reference data: the medication catalog and its lookup tables.
//!
//! Everything here is plain entity state with constructor validation; stock
//! quantities live in the ledger, never on catalog rows.

pub mod medication;
pub mod reason;
pub mod supplier;

pub use medication::{Medication, MedicationId, MedicationPatch, NewMedication};
pub use reason::{NewReason, Reason, ReasonId, ReasonPatch};
pub use supplier::{Supplier, SupplierId};
