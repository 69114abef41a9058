//! Dashboard aggregator: pure recompute-on-read projections.
//!
//! Nothing here mutates state; every value is derived from a store snapshot
//! at call time, which is fine at these data volumes.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use apotheca_catalog::MedicationId;
use apotheca_ledger::{Batch, Movement, MovementKind};

use crate::store::Pharmacy;

/// Headline counts for the stat cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_medications: usize,
    pub active_batches: usize,
    pub low_stock_items: usize,
    pub expiring_soon: usize,
}

/// One day in the movement-volume series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MovementPoint {
    pub date: NaiveDate,
    pub stock_in: i64,
    pub stock_out: i64,
}

/// Ranking entry for the most-dispensed medications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopMedication {
    pub name: String,
    pub dispensed: i64,
}

/// Proportional stock breakdown by category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub units: i64,
    /// Fraction of total units on hand, in `0.0..=1.0`.
    pub share: f64,
}

/// One line in the recent-activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    pub kind: MovementKind,
    pub description: String,
    pub recorded_by: String,
    pub date: NaiveDate,
}

/// Everything the dashboard renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub stats: DashboardStats,
    pub movement_series: Vec<MovementPoint>,
    pub top_medications: Vec<TopMedication>,
    pub stock_distribution: Vec<CategoryShare>,
    pub recent_activity: Vec<ActivityEntry>,
}

/// Recompute the full dashboard from the store's current state.
pub fn snapshot(pharmacy: &Pharmacy, today: NaiveDate) -> DashboardSnapshot {
    let medications = pharmacy.medications();
    let batches = pharmacy.batches();
    let movements = pharmacy.movements();

    let names: HashMap<MedicationId, &str> =
        medications.iter().map(|m| (m.id, m.name.as_str())).collect();

    DashboardSnapshot {
        stats: stats(medications.len(), &batches, today),
        movement_series: movement_series(
            &movements,
            today,
            pharmacy.config().movement_window_days,
        ),
        top_medications: top_medications(&movements, &names),
        stock_distribution: stock_distribution(&medications, &batches),
        recent_activity: recent_activity(
            &movements,
            &batches,
            &names,
            pharmacy.config().recent_activity_limit,
        ),
    }
}

fn stats(total_medications: usize, batches: &[Batch], today: NaiveDate) -> DashboardStats {
    use apotheca_ledger::{ExpiryRisk, StockLevel};

    let active: Vec<&Batch> = batches.iter().filter(|b| b.is_active()).collect();
    DashboardStats {
        total_medications,
        active_batches: active.len(),
        low_stock_items: active
            .iter()
            .filter(|b| b.stock_level() != StockLevel::Normal)
            .count(),
        expiring_soon: active
            .iter()
            .filter(|b| b.expiry_risk(today) != ExpiryRisk::Normal)
            .count(),
    }
}

/// Fixed window ending today, one point per day, oldest first.
fn movement_series(movements: &[Movement], today: NaiveDate, window_days: u32) -> Vec<MovementPoint> {
    (0..window_days as i64)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let mut point = MovementPoint {
                date,
                stock_in: 0,
                stock_out: 0,
            };
            for movement in movements.iter().filter(|m| m.date == date) {
                match movement.kind {
                    MovementKind::In => point.stock_in += movement.quantity(),
                    MovementKind::Out => point.stock_out += movement.quantity(),
                    MovementKind::Adjustment => {}
                }
            }
            point
        })
        .collect()
}

/// Top five medications by dispensed units, ties broken by name.
fn top_medications(
    movements: &[Movement],
    names: &HashMap<MedicationId, &str>,
) -> Vec<TopMedication> {
    let mut dispensed: HashMap<MedicationId, i64> = HashMap::new();
    for movement in movements.iter().filter(|m| m.kind == MovementKind::Out) {
        *dispensed.entry(movement.medication_id).or_default() += movement.quantity();
    }

    let mut ranking: Vec<TopMedication> = dispensed
        .into_iter()
        .filter_map(|(id, units)| {
            names.get(&id).map(|name| TopMedication {
                name: (*name).to_string(),
                dispensed: units,
            })
        })
        .collect();
    ranking.sort_by(|a, b| b.dispensed.cmp(&a.dispensed).then(a.name.cmp(&b.name)));
    ranking.truncate(5);
    ranking
}

/// Units on hand per category across active batches, as shares of the total.
fn stock_distribution(
    medications: &[apotheca_catalog::Medication],
    batches: &[Batch],
) -> Vec<CategoryShare> {
    let categories: HashMap<MedicationId, &str> = medications
        .iter()
        .map(|m| (m.id, m.category.as_str()))
        .collect();

    let mut units: HashMap<&str, i64> = HashMap::new();
    for batch in batches.iter().filter(|b| b.is_active()) {
        let Some(medication_id) = batch.medication_id() else {
            continue;
        };
        if let Some(category) = categories.get(&medication_id) {
            *units.entry(category).or_default() += batch.current_stock();
        }
    }

    let total: i64 = units.values().sum();
    if total == 0 {
        return Vec::new();
    }

    let mut shares: Vec<CategoryShare> = units
        .into_iter()
        .map(|(category, units)| CategoryShare {
            category: category.to_string(),
            units,
            share: units as f64 / total as f64,
        })
        .collect();
    shares.sort_by(|a, b| b.units.cmp(&a.units).then(a.category.cmp(&b.category)));
    shares
}

/// Newest journal entries first, bounded, rendered for humans.
fn recent_activity(
    movements: &[Movement],
    batches: &[Batch],
    names: &HashMap<MedicationId, &str>,
    limit: usize,
) -> Vec<ActivityEntry> {
    let codes: HashMap<_, _> = batches
        .iter()
        .map(|b| (b.id_typed(), b.batch_number()))
        .collect();

    movements
        .iter()
        .rev()
        .take(limit)
        .filter_map(|movement| {
            let name = names.get(&movement.medication_id)?;
            let code = codes.get(&movement.batch_id)?;
            Some(ActivityEntry {
                kind: movement.kind,
                description: describe(movement, name, code),
                recorded_by: movement.recorded_by.clone(),
                date: movement.date,
            })
        })
        .collect()
}

fn describe(movement: &Movement, medication_name: &str, batch_code: &str) -> String {
    match movement.kind {
        MovementKind::In => format!(
            "Received {} units of {medication_name} (Batch {batch_code})",
            movement.quantity()
        ),
        MovementKind::Out => format!(
            "Dispensed {} units of {medication_name} (Batch {batch_code})",
            movement.quantity()
        ),
        MovementKind::Adjustment => format!(
            "Adjusted stock: {:+} units of {medication_name} (Batch {batch_code})",
            movement.delta
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apotheca_auth::{Principal, Role};
    use apotheca_catalog::NewMedication;
    use apotheca_ledger::StockChange;

    use crate::store::{BatchReceipt, MovementDraft, Pharmacy};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn admin() -> Principal {
        Principal::from_role("renatocsrib", Role::new("admin"))
    }

    fn fixture() -> Pharmacy {
        let mut store = Pharmacy::default();
        let actor = admin();

        let paracetamol = store
            .create_medication(
                &actor,
                NewMedication {
                    code: "MED001".to_string(),
                    name: "Paracetamol 500mg".to_string(),
                    category: "Analgesic".to_string(),
                    supplier: "Pharma Inc".to_string(),
                    reorder_level: 100,
                },
            )
            .unwrap();
        let amoxicillin = store
            .create_medication(
                &actor,
                NewMedication {
                    code: "MED002".to_string(),
                    name: "Amoxicillin 250mg".to_string(),
                    category: "Antibiotic".to_string(),
                    supplier: "MediCorp".to_string(),
                    reorder_level: 50,
                },
            )
            .unwrap();

        let b1 = store
            .receive_batch(
                &actor,
                BatchReceipt {
                    medication_id: paracetamol.id,
                    quantity: 100,
                    received_date: date(2024, 5, 29),
                    expiry_date: date(2026, 6, 1),
                    supplier: "Pharma Inc".to_string(),
                    received_by: "admin".to_string(),
                    notes: None,
                },
            )
            .unwrap();
        let b2 = store
            .receive_batch(
                &actor,
                BatchReceipt {
                    medication_id: amoxicillin.id,
                    quantity: 50,
                    received_date: date(2024, 5, 30),
                    // Inside the three-month warning window relative to 2024-06-04.
                    expiry_date: date(2024, 7, 15),
                    supplier: "MediCorp".to_string(),
                    received_by: "admin".to_string(),
                    notes: None,
                },
            )
            .unwrap();

        store
            .record_movement(
                &actor,
                MovementDraft {
                    medication_id: paracetamol.id,
                    batch_id: b1.id_typed(),
                    change: StockChange::Out { quantity: 90 },
                    date: date(2024, 6, 1),
                    reason_id: None,
                    notes: None,
                },
            )
            .unwrap();
        store
            .record_movement(
                &actor,
                MovementDraft {
                    medication_id: amoxicillin.id,
                    batch_id: b2.id_typed(),
                    change: StockChange::Out { quantity: 10 },
                    date: date(2024, 6, 3),
                    reason_id: None,
                    notes: None,
                },
            )
            .unwrap();

        store
    }

    #[test]
    fn stats_count_low_stock_and_expiring_batches() {
        let store = fixture();
        let snap = snapshot(&store, date(2024, 6, 4));

        assert_eq!(snap.stats.total_medications, 2);
        assert_eq!(snap.stats.active_batches, 2);
        // Paracetamol batch is at 10/100 after dispensing 90.
        assert_eq!(snap.stats.low_stock_items, 1);
        // Amoxicillin batch expires within three months.
        assert_eq!(snap.stats.expiring_soon, 1);
    }

    #[test]
    fn movement_series_covers_the_window_oldest_first() {
        let store = fixture();
        let snap = snapshot(&store, date(2024, 6, 4));

        assert_eq!(snap.movement_series.len(), 7);
        assert_eq!(snap.movement_series[0].date, date(2024, 5, 29));
        assert_eq!(snap.movement_series[6].date, date(2024, 6, 4));

        // Receipts landed on 05-29 and 05-30.
        assert_eq!(snap.movement_series[0].stock_in, 100);
        assert_eq!(snap.movement_series[1].stock_in, 50);

        // Dispenses landed on 06-01 and 06-03.
        assert_eq!(snap.movement_series[3].stock_out, 90);
        assert_eq!(snap.movement_series[5].stock_out, 10);
    }

    #[test]
    fn top_medications_rank_by_dispensed_units() {
        let store = fixture();
        let snap = snapshot(&store, date(2024, 6, 4));

        assert_eq!(snap.top_medications.len(), 2);
        assert_eq!(snap.top_medications[0].name, "Paracetamol 500mg");
        assert_eq!(snap.top_medications[0].dispensed, 90);
        assert_eq!(snap.top_medications[1].dispensed, 10);
    }

    #[test]
    fn stock_distribution_shares_sum_to_one() {
        let store = fixture();
        let snap = snapshot(&store, date(2024, 6, 4));

        let total: f64 = snap.stock_distribution.iter().map(|s| s.share).sum();
        assert!((total - 1.0).abs() < 1e-9);

        // 40 units of Antibiotic vs 10 of Analgesic on hand.
        assert_eq!(snap.stock_distribution[0].category, "Antibiotic");
        assert_eq!(snap.stock_distribution[0].units, 40);
    }

    #[test]
    fn recent_activity_is_newest_first_and_bounded() {
        let store = fixture();
        let snap = snapshot(&store, date(2024, 6, 4));

        assert_eq!(snap.recent_activity.len(), 4);
        assert!(snap.recent_activity[0]
            .description
            .starts_with("Dispensed 10 units of Amoxicillin 250mg"));
        assert!(snap.recent_activity[3]
            .description
            .starts_with("Received 100 units of Paracetamol 500mg"));
    }

    #[test]
    fn empty_store_produces_an_empty_dashboard() {
        let store = Pharmacy::default();
        let snap = snapshot(&store, date(2024, 6, 4));

        assert_eq!(snap.stats.total_medications, 0);
        assert_eq!(snap.stats.active_batches, 0);
        assert!(snap.top_medications.is_empty());
        assert!(snap.stock_distribution.is_empty());
        assert!(snap.recent_activity.is_empty());
        assert_eq!(snap.movement_series.len(), 7);
    }
}
