use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use apotheca_catalog::{MedicationId, ReasonId};
use apotheca_core::{Aggregate, AggregateId, AggregateRoot, DomainError};
use apotheca_events::Event;

use crate::movement::StockChange;
use crate::status::{expiry_risk, stock_level, ExpiryRisk, StockLevel};

/// Batch identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(pub AggregateId);

impl BatchId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for BatchId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Batch lifecycle status.
///
/// Deletion is a soft retire so journal entries always resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Active,
    Retired,
}

/// Aggregate root: one received lot of a medication.
///
/// # Invariants
/// - `0 <= current_stock <= quantity` after every applied event.
/// - The batch number and received quantity are fixed at receipt.
/// - Stock changes only through recorded movements; there is no direct edit.
/// - Retired batches accept no further commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    id: BatchId,
    medication_id: Option<MedicationId>,
    batch_number: String,
    quantity: i64,
    received_date: NaiveDate,
    expiry_date: NaiveDate,
    supplier: String,
    received_by: String,
    notes: Option<String>,
    current_stock: i64,
    status: BatchStatus,
    version: u64,
    created: bool,
}

impl Batch {
    /// Create an empty, not-yet-received instance for rehydration.
    pub fn empty(id: BatchId) -> Self {
        Self {
            id,
            medication_id: None,
            batch_number: String::new(),
            quantity: 0,
            received_date: NaiveDate::MIN,
            expiry_date: NaiveDate::MIN,
            supplier: String::new(),
            received_by: String::new(),
            notes: None,
            current_stock: 0,
            status: BatchStatus::Active,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> BatchId {
        self.id
    }

    pub fn medication_id(&self) -> Option<MedicationId> {
        self.medication_id
    }

    pub fn batch_number(&self) -> &str {
        &self.batch_number
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn current_stock(&self) -> i64 {
        self.current_stock
    }

    pub fn received_date(&self) -> NaiveDate {
        self.received_date
    }

    pub fn expiry_date(&self) -> NaiveDate {
        self.expiry_date
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn received_by(&self) -> &str {
        &self.received_by
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn status(&self) -> BatchStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == BatchStatus::Active
    }

    /// Display classification for the expiry column.
    pub fn expiry_risk(&self, today: NaiveDate) -> ExpiryRisk {
        expiry_risk(self.expiry_date, today)
    }

    /// Display classification for the current-stock column.
    pub fn stock_level(&self) -> StockLevel {
        stock_level(self.current_stock, self.quantity)
    }
}

impl AggregateRoot for Batch {
    type Id = BatchId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: Receive (batch creation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receive {
    pub batch_id: BatchId,
    pub medication_id: MedicationId,
    pub batch_number: String,
    pub quantity: i64,
    pub received_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub supplier: String,
    pub received_by: String,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Amend the mutable fields.
///
/// Quantity, received date, batch number, and current stock are not here on
/// purpose; stock corrections go through a recorded adjustment movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amend {
    pub batch_id: BatchId,
    pub expiry_date: NaiveDate,
    pub supplier: String,
    pub received_by: String,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordMovement against this batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMovement {
    pub batch_id: BatchId,
    pub medication_id: MedicationId,
    pub change: StockChange,
    pub date: NaiveDate,
    pub recorded_by: String,
    pub reason_id: Option<ReasonId>,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Retire (soft delete).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Retire {
    pub batch_id: BatchId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchCommand {
    Receive(Receive),
    Amend(Amend),
    RecordMovement(RecordMovement),
    Retire(Retire),
}

/// Event: Received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Received {
    pub batch_id: BatchId,
    pub medication_id: MedicationId,
    pub batch_number: String,
    pub quantity: i64,
    pub received_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub supplier: String,
    pub received_by: String,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: Amended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amended {
    pub batch_id: BatchId,
    pub expiry_date: NaiveDate,
    pub supplier: String,
    pub received_by: String,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: MovementRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRecorded {
    pub batch_id: BatchId,
    pub medication_id: MedicationId,
    pub change: StockChange,
    pub date: NaiveDate,
    pub recorded_by: String,
    pub reason_id: Option<ReasonId>,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: Retired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Retired {
    pub batch_id: BatchId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchEvent {
    Received(Received),
    Amended(Amended),
    MovementRecorded(MovementRecorded),
    Retired(Retired),
}

impl Event for BatchEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BatchEvent::Received(_) => "ledger.batch.received",
            BatchEvent::Amended(_) => "ledger.batch.amended",
            BatchEvent::MovementRecorded(_) => "ledger.batch.movement_recorded",
            BatchEvent::Retired(_) => "ledger.batch.retired",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            BatchEvent::Received(e) => e.occurred_at,
            BatchEvent::Amended(e) => e.occurred_at,
            BatchEvent::MovementRecorded(e) => e.occurred_at,
            BatchEvent::Retired(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Batch {
    type Command = BatchCommand;
    type Event = BatchEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            BatchEvent::Received(e) => {
                self.id = e.batch_id;
                self.medication_id = Some(e.medication_id);
                self.batch_number = e.batch_number.clone();
                self.quantity = e.quantity;
                self.received_date = e.received_date;
                self.expiry_date = e.expiry_date;
                self.supplier = e.supplier.clone();
                self.received_by = e.received_by.clone();
                self.notes = e.notes.clone();
                self.current_stock = e.quantity;
                self.status = BatchStatus::Active;
                self.created = true;
            }
            BatchEvent::Amended(e) => {
                self.expiry_date = e.expiry_date;
                self.supplier = e.supplier.clone();
                self.received_by = e.received_by.clone();
                self.notes = e.notes.clone();
            }
            BatchEvent::MovementRecorded(e) => {
                self.current_stock += e.change.delta();
            }
            BatchEvent::Retired(_) => {
                self.status = BatchStatus::Retired;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            BatchCommand::Receive(cmd) => self.handle_receive(cmd),
            BatchCommand::Amend(cmd) => self.handle_amend(cmd),
            BatchCommand::RecordMovement(cmd) => self.handle_record(cmd),
            BatchCommand::Retire(cmd) => self.handle_retire(cmd),
        }
    }
}

impl Batch {
    fn ensure_live(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.status == BatchStatus::Retired {
            return Err(DomainError::invariant("batch is retired"));
        }
        Ok(())
    }

    fn ensure_medication(&self, medication_id: MedicationId) -> Result<(), DomainError> {
        if self.medication_id != Some(medication_id) {
            return Err(DomainError::validation(
                "batch does not belong to the selected medication",
            ));
        }
        Ok(())
    }

    fn handle_receive(&self, cmd: &Receive) -> Result<Vec<BatchEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("batch already exists"));
        }
        if cmd.batch_number.trim().is_empty() {
            return Err(DomainError::validation("batch number cannot be empty"));
        }
        if cmd.quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if cmd.expiry_date <= cmd.received_date {
            return Err(DomainError::validation(
                "expiry date must be after the received date",
            ));
        }
        if cmd.supplier.trim().is_empty() {
            return Err(DomainError::validation("supplier cannot be empty"));
        }
        if cmd.received_by.trim().is_empty() {
            return Err(DomainError::validation("received-by cannot be empty"));
        }

        Ok(vec![BatchEvent::Received(Received {
            batch_id: cmd.batch_id,
            medication_id: cmd.medication_id,
            batch_number: cmd.batch_number.clone(),
            quantity: cmd.quantity,
            received_date: cmd.received_date,
            expiry_date: cmd.expiry_date,
            supplier: cmd.supplier.clone(),
            received_by: cmd.received_by.clone(),
            notes: cmd.notes.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_amend(&self, cmd: &Amend) -> Result<Vec<BatchEvent>, DomainError> {
        self.ensure_live()?;

        if cmd.expiry_date <= self.received_date {
            return Err(DomainError::validation(
                "expiry date must be after the received date",
            ));
        }
        if cmd.supplier.trim().is_empty() {
            return Err(DomainError::validation("supplier cannot be empty"));
        }

        Ok(vec![BatchEvent::Amended(Amended {
            batch_id: cmd.batch_id,
            expiry_date: cmd.expiry_date,
            supplier: cmd.supplier.clone(),
            received_by: cmd.received_by.clone(),
            notes: cmd.notes.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record(&self, cmd: &RecordMovement) -> Result<Vec<BatchEvent>, DomainError> {
        self.ensure_live()?;
        self.ensure_medication(cmd.medication_id)?;

        match cmd.change {
            StockChange::In { quantity } | StockChange::Out { quantity } if quantity <= 0 => {
                return Err(DomainError::validation("quantity must be positive"));
            }
            StockChange::Adjustment { delta } if delta == 0 => {
                return Err(DomainError::validation("adjustment delta cannot be zero"));
            }
            StockChange::Out { quantity } if quantity > self.current_stock => {
                return Err(DomainError::invariant(format!(
                    "cannot dispense more than the current stock ({})",
                    self.current_stock
                )));
            }
            _ => {}
        }

        let next = self.current_stock + cmd.change.delta();
        if next < 0 || next > self.quantity {
            return Err(DomainError::invariant(format!(
                "stock must stay between 0 and the received quantity ({})",
                self.quantity
            )));
        }

        Ok(vec![BatchEvent::MovementRecorded(MovementRecorded {
            batch_id: cmd.batch_id,
            medication_id: cmd.medication_id,
            change: cmd.change,
            date: cmd.date,
            recorded_by: cmd.recorded_by.clone(),
            reason_id: cmd.reason_id,
            notes: cmd.notes.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_retire(&self, cmd: &Retire) -> Result<Vec<BatchEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.status == BatchStatus::Retired {
            return Err(DomainError::conflict("batch is already retired"));
        }

        Ok(vec![BatchEvent::Retired(Retired {
            batch_id: cmd.batch_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
