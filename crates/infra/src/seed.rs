//! Demo dataset: a small pharmacy with realistic reference data, a few
//! received batches, and some dispensing history. Used by examples and tests.

use chrono::NaiveDate;

use apotheca_auth::{NewAccount, Principal, Role};
use apotheca_catalog::{NewMedication, NewReason, Supplier, SupplierId};
use apotheca_core::{DomainError, DomainResult};
use apotheca_ledger::StockChange;

use crate::store::{BatchReceipt, MovementDraft, Pharmacy, PharmacyConfig};

fn date(y: i32, m: u32, d: u32) -> DomainResult<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| DomainError::validation("invalid seed date"))
}

/// Build a demo store. Fails only if the seed data itself is inconsistent.
pub fn demo() -> DomainResult<Pharmacy> {
    let mut store = Pharmacy::new(PharmacyConfig::default());
    let admin = Principal::from_role("renatocsrib", Role::new("admin"));
    let pharmacist = Principal::from_role("maria", Role::new("pharmacist"));

    for name in [
        "Pharma Inc",
        "MediCorp",
        "AllergyCare",
        "DiabeCare",
        "CardioMed",
        "RespiCare",
    ] {
        let supplier = Supplier::create(SupplierId::new(), name)?;
        store.insert_supplier(supplier);
    }

    for (code, description) in [
        ("ADJ", "Stock adjustment"),
        ("RET", "Customer return"),
        ("LOSS", "Breakage or loss"),
        ("EXP", "Expired stock"),
        ("DON", "Donation"),
    ] {
        store.create_reason(
            &admin,
            NewReason {
                code: code.to_string(),
                description: description.to_string(),
            },
        )?;
    }

    let medications = [
        ("MED001", "Paracetamol 500mg", "Analgesic", "Pharma Inc", 100),
        ("MED002", "Amoxicillin 250mg", "Antibiotic", "MediCorp", 50),
        ("MED003", "Omeprazole 20mg", "Antacid", "Pharma Inc", 40),
        ("MED004", "Loratadine 10mg", "Antihistamine", "AllergyCare", 30),
        ("MED006", "Metformin 500mg", "Diabetes", "DiabeCare", 60),
        ("MED008", "Ibuprofen 400mg", "Analgesic", "Pharma Inc", 80),
        ("MED009", "Salbutamol Inhaler", "Respiratory", "RespiCare", 20),
        ("MED010", "Amlodipine 5mg", "Cardiovascular", "CardioMed", 45),
    ];
    let mut ids = Vec::new();
    for (code, name, category, supplier, reorder_level) in medications {
        let medication = store.create_medication(
            &admin,
            NewMedication {
                code: code.to_string(),
                name: name.to_string(),
                category: category.to_string(),
                supplier: supplier.to_string(),
                reorder_level,
            },
        )?;
        ids.push(medication.id);
    }

    let receipts = [
        // (medication index, quantity, received, expiry)
        (0, 1000, (2023, 10, 15), (2025, 10, 15)),
        (1, 500, (2023, 11, 2), (2024, 11, 2)),
        (2, 400, (2023, 12, 10), (2025, 6, 10)),
        (0, 800, (2024, 1, 5), (2026, 1, 5)),
        (3, 300, (2024, 1, 20), (2025, 1, 20)),
        (5, 600, (2024, 2, 15), (2026, 2, 15)),
    ];
    let mut batch_ids = Vec::new();
    for (idx, quantity, (ry, rm, rd), (ey, em, ed)) in receipts {
        let medication = store
            .medication(ids[idx])
            .ok_or_else(|| DomainError::validation("seed medication missing"))?;
        let batch = store.receive_batch(
            &admin,
            BatchReceipt {
                medication_id: medication.id,
                quantity,
                received_date: date(ry, rm, rd)?,
                expiry_date: date(ey, em, ed)?,
                supplier: medication.supplier.clone(),
                received_by: "renatocsrib".to_string(),
                notes: None,
            },
        )?;
        batch_ids.push(batch.id_typed());
    }

    let dispenses = [
        // (medication index, batch index, quantity, date)
        (0, 0, 50, (2023, 10, 20)),
        (0, 0, 100, (2023, 11, 15)),
        (1, 1, 75, (2023, 12, 20)),
        (2, 2, 50, (2024, 1, 10)),
        (0, 0, 70, (2024, 1, 15)),
        (3, 4, 90, (2024, 2, 1)),
    ];
    for (med_idx, batch_idx, quantity, (y, m, d)) in dispenses {
        store.record_movement(
            &pharmacist,
            MovementDraft {
                medication_id: ids[med_idx],
                batch_id: batch_ids[batch_idx],
                change: StockChange::Out { quantity },
                date: date(y, m, d)?,
                reason_id: None,
                notes: None,
            },
        )?;
    }

    // One reconciliation after a shelf count came up short.
    let adj = store
        .reasons()
        .into_iter()
        .find(|r| r.code == "ADJ")
        .ok_or_else(|| DomainError::validation("seed reason missing"))?;
    store.record_movement(
        &pharmacist,
        MovementDraft {
            medication_id: ids[5],
            batch_id: batch_ids[5],
            change: StockChange::Adjustment { delta: -5 },
            date: date(2024, 3, 1)?,
            reason_id: Some(adj.id),
            notes: Some("cycle count".to_string()),
        },
    )?;

    let accounts = [
        ("renatocsrib", "Renato Silva", "renato@example.com", "admin"),
        ("maria", "Maria Oliveira", "maria@example.com", "pharmacist"),
        ("carlos", "Carlos Santos", "carlos@example.com", "assistant"),
        ("user", "Test User", "user@example.com", "user"),
    ];
    for (username, full_name, email, role) in accounts {
        let role = Role::new(role.to_string());
        let permissions = apotheca_auth::permissions_for_role(&role);
        store.create_account(
            &admin,
            NewAccount {
                username: username.to_string(),
                full_name: full_name.to_string(),
                email: email.to_string(),
                role,
                permissions,
            },
        )?;
    }

    // Carlos is on leave.
    let carlos = store
        .accounts()
        .into_iter()
        .find(|a| a.username == "carlos")
        .ok_or_else(|| DomainError::validation("seed account missing"))?;
    store.toggle_account_status(&admin, carlos.id)?;

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use apotheca_auth::{Credentials, SessionProvider};
    use apotheca_ledger::MovementKind;

    #[test]
    fn demo_store_is_internally_consistent() {
        let store = demo().unwrap();

        assert_eq!(store.suppliers().len(), 6);
        assert_eq!(store.reasons().len(), 5);
        assert_eq!(store.medications().len(), 8);
        assert_eq!(store.batches().len(), 6);
        assert_eq!(store.accounts().len(), 4);

        // Every journal row resolves, and every batch honors the envelope.
        for movement in store.movements() {
            assert!(store.batch(movement.batch_id).is_some());
        }
        for batch in store.batches() {
            assert!(batch.current_stock() >= 0);
            assert!(batch.current_stock() <= batch.quantity());
        }
    }

    #[test]
    fn demo_stock_matches_the_journal() {
        let store = demo().unwrap();

        for batch in store.batches() {
            let journaled: i64 = store
                .movements()
                .iter()
                .filter(|m| m.batch_id == batch.id_typed())
                .map(|m| m.delta)
                .sum();
            assert_eq!(batch.current_stock(), journaled);
        }
    }

    #[test]
    fn demo_has_receipts_dispenses_and_one_adjustment() {
        let store = demo().unwrap();
        let movements = store.movements();

        assert_eq!(
            movements.iter().filter(|m| m.kind == MovementKind::In).count(),
            6
        );
        assert_eq!(
            movements.iter().filter(|m| m.kind == MovementKind::Out).count(),
            6
        );
        assert_eq!(
            movements
                .iter()
                .filter(|m| m.kind == MovementKind::Adjustment)
                .count(),
            1
        );
    }

    #[test]
    fn medication_table_searches_and_exports_over_demo_data() {
        use apotheca_catalog::Medication;

        use crate::export::CsvSink;
        use crate::table::{Column, TableOptions, TableView};

        let store = demo().unwrap();
        let mut view = TableView::new(
            store.medications(),
            vec![
                Column::new("Code", |m: &Medication| m.code.clone()),
                Column::new("Name", |m: &Medication| m.name.clone()),
                Column::new("Category", |m: &Medication| m.category.clone()),
            ],
            TableOptions {
                page_size: store.config().page_size,
                ..TableOptions::default()
            },
        );

        view.set_query("analgesic");
        assert_eq!(view.filtered_count(), 2);

        let bytes = view
            .export_to(&CsvSink::new(), Some("Medication List"))
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("Paracetamol 500mg"));
        assert!(text.contains("Ibuprofen 400mg"));
        assert!(!text.contains("Amoxicillin 250mg"));
    }

    #[test]
    fn demo_accounts_can_sign_in_through_the_directory() {
        let store = demo().unwrap();
        let session = store.directory_session();

        let principal = session
            .authenticate(&Credentials {
                email: "maria@example.com".to_string(),
                password: "secret".to_string(),
            })
            .unwrap();
        assert_eq!(principal.role.as_str(), "pharmacist");

        // Carlos is inactive and cannot sign in.
        assert!(session
            .authenticate(&Credentials {
                email: "carlos@example.com".to_string(),
                password: "secret".to_string(),
            })
            .is_err());
    }
}
