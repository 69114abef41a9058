//! Application state and read-side plumbing.
//!
//! `Pharmacy` is the explicit store object: constructed at startup, injected
//! into whatever needs it, reset-able for tests. Projections, the generic
//! table view, and the export seam are pure consumers of its snapshots.

pub mod export;
pub mod projections;
pub mod seed;
pub mod store;
pub mod table;

pub use export::{CsvSink, ExportError, ExportSink};
pub use store::{BatchAmendment, BatchReceipt, MovementDraft, Pharmacy, PharmacyConfig};
pub use table::{Column, TableOptions, TableView};
