//! The explicit application store.
//!
//! One `Pharmacy` instance owns every collection plus the per-medication
//! batch counters and the append-only event log. Owned state is mutated
//! behind `&mut self`; reads hand out snapshots, so observers never alias
//! live state. Every mutating operation takes the acting principal and is
//! permission-gated before anything changes.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use apotheca_auth::{
    permissions, require, Account, AccountPatch, AccountStatus, DirectorySession, NewAccount,
    Principal,
};
use apotheca_catalog::{
    Medication, MedicationId, MedicationPatch, NewMedication, NewReason, Reason, ReasonId,
    ReasonPatch, Supplier,
};
use apotheca_core::{
    Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult, ExpectedVersion, UserId,
};
use apotheca_events::{Event, EventEnvelope};
use apotheca_ledger::{
    batch_number, Amend, Batch, BatchCommand, BatchEvent, BatchId, Movement, MovementId,
    MovementKind, Receive, RecordMovement, Retire, StockChange,
};

/// Tunables injected at construction.
#[derive(Debug, Clone)]
pub struct PharmacyConfig {
    /// Rows per table page.
    pub page_size: usize,
    /// Entries in the dashboard activity feed.
    pub recent_activity_limit: usize,
    /// Days covered by the dashboard movement series.
    pub movement_window_days: u32,
}

impl Default for PharmacyConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            recent_activity_limit: 5,
            movement_window_days: 7,
        }
    }
}

/// Input for receiving a new batch.
#[derive(Debug, Clone)]
pub struct BatchReceipt {
    pub medication_id: MedicationId,
    pub quantity: i64,
    pub received_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub supplier: String,
    pub received_by: String,
    pub notes: Option<String>,
}

/// Replacement values for a batch's mutable fields.
#[derive(Debug, Clone)]
pub struct BatchAmendment {
    pub expiry_date: NaiveDate,
    pub supplier: String,
    pub received_by: String,
    pub notes: Option<String>,
}

/// Input for a journal entry. The acting principal is recorded as the user.
#[derive(Debug, Clone)]
pub struct MovementDraft {
    pub medication_id: MedicationId,
    pub batch_id: BatchId,
    pub change: StockChange,
    pub date: NaiveDate,
    pub reason_id: Option<ReasonId>,
    pub notes: Option<String>,
}

/// Application state, constructed at startup and injected everywhere.
#[derive(Debug, Default)]
pub struct Pharmacy {
    config: PharmacyConfig,
    medications: Vec<Medication>,
    suppliers: Vec<Supplier>,
    reasons: Vec<Reason>,
    accounts: Vec<Account>,
    batches: Vec<Batch>,
    movements: Vec<Movement>,
    /// Per-medication receipt counter; survives retires so codes never recycle.
    batch_counters: HashMap<MedicationId, u32>,
    event_log: Vec<EventEnvelope<BatchEvent>>,
}

impl Pharmacy {
    pub fn new(config: PharmacyConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &PharmacyConfig {
        &self.config
    }

    /// Drop all state (including counters). For tests.
    pub fn reset(&mut self) {
        self.medications.clear();
        self.suppliers.clear();
        self.reasons.clear();
        self.accounts.clear();
        self.batches.clear();
        self.movements.clear();
        self.batch_counters.clear();
        self.event_log.clear();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reads (snapshots, ungated)
    // ─────────────────────────────────────────────────────────────────────

    pub fn medications(&self) -> Vec<Medication> {
        self.medications.clone()
    }

    pub fn suppliers(&self) -> Vec<Supplier> {
        self.suppliers.clone()
    }

    pub fn reasons(&self) -> Vec<Reason> {
        self.reasons.clone()
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.accounts.clone()
    }

    pub fn batches(&self) -> Vec<Batch> {
        self.batches.clone()
    }

    pub fn active_batches(&self) -> Vec<Batch> {
        self.batches.iter().filter(|b| b.is_active()).cloned().collect()
    }

    pub fn batch(&self, id: BatchId) -> Option<Batch> {
        self.batches.iter().find(|b| b.id_typed() == id).cloned()
    }

    pub fn movements(&self) -> Vec<Movement> {
        self.movements.clone()
    }

    pub fn event_log(&self) -> Vec<EventEnvelope<BatchEvent>> {
        self.event_log.clone()
    }

    pub fn medication(&self, id: MedicationId) -> Option<Medication> {
        self.medications.iter().find(|m| m.id == id).cloned()
    }

    /// Session provider over the current account directory.
    pub fn directory_session(&self) -> DirectorySession {
        DirectorySession::new(self.accounts.clone())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Medication catalog
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_medication(
        &mut self,
        actor: &Principal,
        input: NewMedication,
    ) -> DomainResult<Medication> {
        require(actor, permissions::MEDICATIONS_MANAGE)?;

        if self.medications.iter().any(|m| m.code == input.code.trim()) {
            return Err(DomainError::conflict("medication code already exists"));
        }

        let medication = Medication::create(MedicationId::new(), input)?;
        self.medications.push(medication.clone());
        Ok(medication)
    }

    pub fn update_medication(
        &mut self,
        actor: &Principal,
        id: MedicationId,
        patch: MedicationPatch,
    ) -> DomainResult<Medication> {
        require(actor, permissions::MEDICATIONS_MANAGE)?;

        let current = self
            .medications
            .iter()
            .find(|m| m.id == id)
            .ok_or(DomainError::NotFound)?;
        let updated = current.apply_patch(patch)?;

        self.medications = self
            .medications
            .iter()
            .map(|m| if m.id == id { updated.clone() } else { m.clone() })
            .collect();
        Ok(updated)
    }

    /// Delete a catalog entry.
    ///
    /// Rejected while any batch (active or retired) still references it, so
    /// ledger history always resolves.
    pub fn delete_medication(&mut self, actor: &Principal, id: MedicationId) -> DomainResult<()> {
        require(actor, permissions::MEDICATIONS_MANAGE)?;

        if self.medications.iter().all(|m| m.id != id) {
            return Err(DomainError::NotFound);
        }
        if self.batches.iter().any(|b| b.medication_id() == Some(id)) {
            return Err(DomainError::invariant(
                "medication still has batches on the ledger",
            ));
        }

        self.medications.retain(|m| m.id != id);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reasons
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_reason(&mut self, actor: &Principal, input: NewReason) -> DomainResult<Reason> {
        require(actor, permissions::INVENTORY_MANAGE)?;

        if self
            .reasons
            .iter()
            .any(|r| r.code == input.code.trim().to_uppercase())
        {
            return Err(DomainError::conflict("reason code already exists"));
        }

        let reason = Reason::create(ReasonId::new(), input)?;
        self.reasons.push(reason.clone());
        Ok(reason)
    }

    pub fn update_reason(
        &mut self,
        actor: &Principal,
        id: ReasonId,
        patch: ReasonPatch,
    ) -> DomainResult<Reason> {
        require(actor, permissions::INVENTORY_MANAGE)?;

        let current = self
            .reasons
            .iter()
            .find(|r| r.id == id)
            .ok_or(DomainError::NotFound)?;
        let updated = current.apply_patch(patch)?;

        self.reasons = self
            .reasons
            .iter()
            .map(|r| if r.id == id { updated.clone() } else { r.clone() })
            .collect();
        Ok(updated)
    }

    pub fn delete_reason(&mut self, actor: &Principal, id: ReasonId) -> DomainResult<()> {
        require(actor, permissions::INVENTORY_MANAGE)?;

        if self.reasons.iter().all(|r| r.id != id) {
            return Err(DomainError::NotFound);
        }
        self.reasons.retain(|r| r.id != id);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Batch ledger
    // ─────────────────────────────────────────────────────────────────────

    /// Receive a new batch.
    ///
    /// Generates the batch code from the per-medication counter and records
    /// the receipt itself as an `In` journal entry, so the journal stays a
    /// complete account of the batch's stock.
    pub fn receive_batch(&mut self, actor: &Principal, receipt: BatchReceipt) -> DomainResult<Batch> {
        require(actor, permissions::BATCHES_MANAGE)?;

        let medication = self
            .medication(receipt.medication_id)
            .ok_or_else(|| DomainError::validation("select a valid medication"))?;

        let ordinal = self
            .batch_counters
            .get(&medication.id)
            .copied()
            .unwrap_or(0)
            + 1;
        let code = batch_number(&medication.name, ordinal, receipt.received_date);

        let batch_id = BatchId::new(AggregateId::new());
        let shell = Batch::empty(batch_id);
        let events = shell.handle(&BatchCommand::Receive(Receive {
            batch_id,
            medication_id: medication.id,
            batch_number: code.clone(),
            quantity: receipt.quantity,
            received_date: receipt.received_date,
            expiry_date: receipt.expiry_date,
            supplier: receipt.supplier,
            received_by: receipt.received_by,
            notes: receipt.notes,
            occurred_at: Utc::now(),
        }))?;

        let mut batch = shell;
        for event in &events {
            batch.apply(event);
            self.append_event(&batch, event);
        }
        self.batches.push(batch.clone());
        self.batch_counters.insert(medication.id, ordinal);

        tracing::info!(batch = %code, medication = %medication.name, quantity = receipt.quantity, "batch received");
        Ok(batch)
    }

    /// Replace a batch's mutable fields. Stock is not touchable here; use a
    /// recorded adjustment movement instead.
    pub fn amend_batch(
        &mut self,
        actor: &Principal,
        batch_id: BatchId,
        amendment: BatchAmendment,
    ) -> DomainResult<Batch> {
        require(actor, permissions::BATCHES_MANAGE)?;

        let (events, expected) = {
            let batch = self
                .batches
                .iter()
                .find(|b| b.id_typed() == batch_id)
                .ok_or(DomainError::NotFound)?;
            let events = batch.handle(&BatchCommand::Amend(Amend {
                batch_id,
                expiry_date: amendment.expiry_date,
                supplier: amendment.supplier,
                received_by: amendment.received_by,
                notes: amendment.notes,
                occurred_at: Utc::now(),
            }))?;
            (events, ExpectedVersion::Exact(batch.version()))
        };

        let (batch, _) = self.commit(batch_id, expected, events)?;
        Ok(batch)
    }

    /// Soft-delete a batch. Its journal entries are retained and keep
    /// resolving; the batch accepts no further commands.
    pub fn retire_batch(&mut self, actor: &Principal, batch_id: BatchId) -> DomainResult<Batch> {
        require(actor, permissions::BATCHES_MANAGE)?;

        let (events, expected) = {
            let batch = self
                .batches
                .iter()
                .find(|b| b.id_typed() == batch_id)
                .ok_or(DomainError::NotFound)?;
            let events = batch.handle(&BatchCommand::Retire(Retire {
                batch_id,
                occurred_at: Utc::now(),
            }))?;
            (events, ExpectedVersion::Exact(batch.version()))
        };

        let (batch, _) = self.commit(batch_id, expected, events)?;
        tracing::info!(batch = %batch.batch_number(), "batch retired");
        Ok(batch)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Movement journal
    // ─────────────────────────────────────────────────────────────────────

    /// Record a stock movement.
    ///
    /// Validation happens before anything is written; the journal append and
    /// the stock update then land together. No partial state is observable.
    pub fn record_movement(
        &mut self,
        actor: &Principal,
        draft: MovementDraft,
    ) -> DomainResult<Movement> {
        require(actor, permissions::INVENTORY_MANAGE)?;

        if self.medications.iter().all(|m| m.id != draft.medication_id) {
            return Err(DomainError::validation("select a valid medication"));
        }
        if let Some(reason_id) = draft.reason_id {
            let reason = self
                .reasons
                .iter()
                .find(|r| r.id == reason_id)
                .ok_or_else(|| DomainError::validation("select a valid reason"))?;
            if !reason.active {
                return Err(DomainError::validation("reason is inactive"));
            }
        }

        let (events, expected) = {
            let batch = self
                .batches
                .iter()
                .find(|b| b.id_typed() == draft.batch_id)
                .ok_or(DomainError::NotFound)?;
            let events = batch.handle(&BatchCommand::RecordMovement(RecordMovement {
                batch_id: draft.batch_id,
                medication_id: draft.medication_id,
                change: draft.change,
                date: draft.date,
                recorded_by: actor.username.clone(),
                reason_id: draft.reason_id,
                notes: draft.notes,
                occurred_at: Utc::now(),
            }))?;
            (events, ExpectedVersion::Exact(batch.version()))
        };

        let (batch, rows) = self.commit(draft.batch_id, expected, events)?;
        let movement = rows
            .into_iter()
            .next_back()
            .ok_or_else(|| DomainError::invariant("movement was not journaled"))?;

        tracing::info!(
            batch = %batch.batch_number(),
            kind = %movement.kind,
            delta = movement.delta,
            stock = batch.current_stock(),
            "movement recorded"
        );
        Ok(movement)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Account directory
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_account(&mut self, actor: &Principal, input: NewAccount) -> DomainResult<Account> {
        require(actor, permissions::USERS_MANAGE)?;

        if self.accounts.iter().any(|a| a.username == input.username.trim()) {
            return Err(DomainError::conflict("username already taken"));
        }

        let account = Account::create(UserId::new(), input)?;
        self.accounts.push(account.clone());
        Ok(account)
    }

    pub fn update_account(
        &mut self,
        actor: &Principal,
        id: UserId,
        patch: AccountPatch,
    ) -> DomainResult<Account> {
        require(actor, permissions::USERS_MANAGE)?;

        let current = self
            .accounts
            .iter()
            .find(|a| a.id == id)
            .ok_or(DomainError::NotFound)?;
        if current.is_owned_by(actor) && patch.status == AccountStatus::Inactive {
            return Err(DomainError::invariant(
                "you cannot deactivate your own account",
            ));
        }
        let updated = current.apply_patch(patch)?;

        self.accounts = self
            .accounts
            .iter()
            .map(|a| if a.id == id { updated.clone() } else { a.clone() })
            .collect();
        Ok(updated)
    }

    pub fn toggle_account_status(&mut self, actor: &Principal, id: UserId) -> DomainResult<Account> {
        require(actor, permissions::USERS_MANAGE)?;

        let current = self
            .accounts
            .iter()
            .find(|a| a.id == id)
            .ok_or(DomainError::NotFound)?;
        if current.is_owned_by(actor) {
            return Err(DomainError::invariant(
                "you cannot deactivate your own account",
            ));
        }

        let mut updated = current.clone();
        updated.status = updated.status.toggled();

        self.accounts = self
            .accounts
            .iter()
            .map(|a| if a.id == id { updated.clone() } else { a.clone() })
            .collect();
        Ok(updated)
    }

    pub fn delete_account(&mut self, actor: &Principal, id: UserId) -> DomainResult<()> {
        require(actor, permissions::USERS_MANAGE)?;

        let target = self
            .accounts
            .iter()
            .find(|a| a.id == id)
            .ok_or(DomainError::NotFound)?;
        if target.is_owned_by(actor) {
            return Err(DomainError::invariant("you cannot delete your own account"));
        }

        self.accounts.retain(|a| a.id != id);
        Ok(())
    }

    /// Stamp a successful sign-in. Called from the login flow, not gated.
    pub fn record_login(&mut self, username: &str, at: DateTime<Utc>) -> DomainResult<()> {
        let Some(account) = self.accounts.iter_mut().find(|a| a.username == username) else {
            return Err(DomainError::NotFound);
        };
        account.last_login = Some(at);
        Ok(())
    }

    /// Seeding hook: insert reference rows without going through the gates.
    pub(crate) fn insert_supplier(&mut self, supplier: Supplier) {
        self.suppliers.push(supplier);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────

    /// Apply events to an existing batch, appending to the event log and the
    /// journal. Returns the updated batch and any journal rows created.
    ///
    /// The version check is what a service-backed deployment would turn into
    /// a transaction or optimistic-concurrency token around the journal's
    /// check-then-update.
    fn commit(
        &mut self,
        batch_id: BatchId,
        expected: ExpectedVersion,
        events: Vec<BatchEvent>,
    ) -> DomainResult<(Batch, Vec<Movement>)> {
        let position = self
            .batches
            .iter()
            .position(|b| b.id_typed() == batch_id)
            .ok_or(DomainError::NotFound)?;
        expected.check(self.batches[position].version())?;

        let mut updated = self.batches[position].clone();
        let mut rows = Vec::new();
        for event in &events {
            updated.apply(event);
            rows.extend(self.append_event(&updated, event));
        }
        self.batches[position] = updated.clone();
        Ok((updated, rows))
    }

    /// Append one event to the log and derive its journal row, if any.
    fn append_event(&mut self, batch: &Batch, event: &BatchEvent) -> Option<Movement> {
        tracing::debug!(event = event.event_type(), batch = %batch.batch_number(), "event appended");
        self.event_log.push(EventEnvelope::new(
            Uuid::now_v7(),
            batch.id_typed().0,
            "ledger.batch",
            batch.version(),
            event.clone(),
        ));

        let movement = match event {
            BatchEvent::Received(e) => Some(Movement {
                id: MovementId::new(),
                kind: MovementKind::In,
                medication_id: e.medication_id,
                batch_id: e.batch_id,
                delta: e.quantity,
                date: e.received_date,
                recorded_by: e.received_by.clone(),
                reason_id: None,
                notes: e.notes.clone(),
            }),
            BatchEvent::MovementRecorded(e) => Some(Movement {
                id: MovementId::new(),
                kind: e.change.kind(),
                medication_id: e.medication_id,
                batch_id: e.batch_id,
                delta: e.change.delta(),
                date: e.date,
                recorded_by: e.recorded_by.clone(),
                reason_id: e.reason_id,
                notes: e.notes.clone(),
            }),
            BatchEvent::Amended(_) | BatchEvent::Retired(_) => None,
        };

        if let Some(movement) = &movement {
            self.movements.push(movement.clone());
        }
        movement
    }
}
