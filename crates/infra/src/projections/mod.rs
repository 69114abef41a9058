//! Read-side projections over store snapshots.

pub mod dashboard;

pub use dashboard::{
    ActivityEntry, CategoryShare, DashboardSnapshot, DashboardStats, MovementPoint, TopMedication,
};
