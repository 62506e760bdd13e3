//! # Core Domain Entities
//!
//! The Operation Record and its state machine.
//!
//! ```text
//! PENDING_SUBMIT ──accepted──→ PENDING_CONFIRM ──receipt──→ CONFIRMED
//!       │                            │
//!       └──────rejected──────→ FAILED ←──reverted/rejected──┘
//! ```

use crate::errors::{ClassifiedError, TransitionError};
use crate::ids::{LedgerTxId, LocalId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of operation kinds the relay submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    /// Rebalance protocol allocations (basis points summing to 10000).
    #[serde(alias = "UPDATE_ALLOCATION")]
    AllocationUpdate,
    /// Update governance risk constraints.
    #[serde(alias = "SET_CONSTRAINTS")]
    ConstraintSet,
    /// Accrue protocol yields.
    #[serde(alias = "ACCRUE_YIELDS")]
    YieldAccrual,
    /// Deposit funds.
    Deposit,
    /// Withdraw funds.
    Withdraw,
    /// Automated risk-engine orchestration.
    #[serde(alias = "AI_ORCHESTRATION")]
    Orchestration,
    /// Anything written by a newer or foreign writer.
    #[serde(other)]
    Unknown,
}

impl OperationKind {
    /// All kinds, in display order.
    pub const ALL: [OperationKind; 7] = [
        OperationKind::AllocationUpdate,
        OperationKind::ConstraintSet,
        OperationKind::YieldAccrual,
        OperationKind::Deposit,
        OperationKind::Withdraw,
        OperationKind::Orchestration,
        OperationKind::Unknown,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::AllocationUpdate => "Update Allocation",
            OperationKind::ConstraintSet => "Set Constraints",
            OperationKind::YieldAccrual => "Accrue Yields",
            OperationKind::Deposit => "Deposit",
            OperationKind::Withdraw => "Withdraw",
            OperationKind::Orchestration => "Risk Orchestration",
            OperationKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle status of an Operation Record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    /// Recorded locally, not yet accepted by the ledger.
    #[default]
    PendingSubmit,
    /// Accepted by the ledger, awaiting a receipt.
    PendingConfirm,
    /// Receipt shows success.
    Confirmed,
    /// Rejected at submission, or receipt shows failure.
    Failed,
}

impl OperationStatus {
    /// Terminal states admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationStatus::Confirmed | OperationStatus::Failed)
    }

    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: OperationStatus) -> bool {
        match (self, next) {
            (Self::PendingSubmit, Self::PendingConfirm) => true,
            (Self::PendingSubmit, Self::Failed) => true,
            (Self::PendingConfirm, Self::Confirmed) => true,
            (Self::PendingConfirm, Self::Failed) => true,
            _ => false,
        }
    }

    /// Lower-case label for display.
    pub fn label(&self) -> &'static str {
        match self {
            OperationStatus::PendingSubmit => "submitting",
            OperationStatus::PendingConfirm => "pending",
            OperationStatus::Confirmed => "confirmed",
            OperationStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One submitted operation, as persisted in an Actor Ledger.
///
/// Every field added after the first schema carries `#[serde(default)]` so
/// older records keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// Caller-generated primary key. Immutable.
    pub local_id: LocalId,
    /// Ledger-issued id, set once on accepted submission.
    #[serde(default)]
    pub id: Option<LedgerTxId>,
    /// Operation kind.
    pub kind: OperationKind,
    /// Lifecycle status.
    #[serde(default)]
    pub status: OperationStatus,
    /// Submission attempt time, unix millis.
    #[serde(default)]
    pub submitted_at: u64,
    /// Opaque display payload.
    #[serde(default)]
    pub details: serde_json::Value,
    /// Present only once the record is FAILED.
    #[serde(default)]
    pub error: Option<ClassifiedError>,
    /// Block depth below head at confirmation time.
    #[serde(default)]
    pub confirmations: u64,
    /// Receipt block, once known.
    #[serde(default)]
    pub block_number: Option<u64>,
    /// Actual fee reported by the receipt.
    #[serde(default)]
    pub fee: Option<String>,
}

impl OperationRecord {
    /// Create a fresh PENDING_SUBMIT record.
    pub fn new(kind: OperationKind, details: serde_json::Value, submitted_at: u64) -> Self {
        Self {
            local_id: LocalId::generate(),
            id: None,
            kind,
            status: OperationStatus::PendingSubmit,
            submitted_at,
            details,
            error: None,
            confirmations: 0,
            block_number: None,
            fee: None,
        }
    }

    /// Apply a patch, enforcing the record invariants.
    ///
    /// The record is left untouched when an error is returned.
    pub fn apply(&mut self, patch: RecordPatch) -> Result<(), TransitionError> {
        let next = patch.status.unwrap_or(self.status);

        if self.status.is_terminal() {
            return Err(TransitionError::InvalidStatus {
                from: self.status,
                to: next,
            });
        }
        if next != self.status && !self.status.can_transition_to(next) {
            return Err(TransitionError::InvalidStatus {
                from: self.status,
                to: next,
            });
        }
        if let (Some(existing), Some(new_id)) = (&self.id, &patch.id) {
            if existing != new_id {
                return Err(TransitionError::IdAlreadySet {
                    existing: existing.clone(),
                });
            }
        }

        if let Some(id) = patch.id {
            self.id = Some(id);
        }
        self.status = next;
        if next == OperationStatus::Failed {
            self.error = patch.error;
        }
        if let Some(confirmations) = patch.confirmations {
            self.confirmations = confirmations;
        }
        if let Some(block) = patch.block_number {
            self.block_number = Some(block);
        }
        if let Some(fee) = patch.fee {
            self.fee = Some(fee);
        }
        Ok(())
    }
}

/// Partial update applied to an Operation Record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    /// Ledger id to attach.
    pub id: Option<LedgerTxId>,
    /// New status.
    pub status: Option<OperationStatus>,
    /// Classified error (kept only when the status becomes FAILED).
    pub error: Option<ClassifiedError>,
    /// Confirmation depth.
    pub confirmations: Option<u64>,
    /// Receipt block.
    pub block_number: Option<u64>,
    /// Receipt fee.
    pub fee: Option<String>,
}

impl RecordPatch {
    /// Ledger accepted the submission.
    pub fn accepted(id: impl Into<LedgerTxId>) -> Self {
        Self {
            id: Some(id.into()),
            status: Some(OperationStatus::PendingConfirm),
            ..Default::default()
        }
    }

    /// Operation failed with a classified error.
    pub fn failed(error: ClassifiedError) -> Self {
        Self {
            status: Some(OperationStatus::Failed),
            error: Some(error),
            ..Default::default()
        }
    }

    /// Receipt shows success.
    pub fn confirmed(confirmations: u64, block_number: Option<u64>, fee: Option<String>) -> Self {
        Self {
            status: Some(OperationStatus::Confirmed),
            confirmations: Some(confirmations),
            block_number,
            fee,
            ..Default::default()
        }
    }

    /// Receipt is in a block but has no verdict yet. Leaves the status alone.
    pub fn progress(confirmations: u64, block_number: Option<u64>) -> Self {
        Self {
            confirmations: Some(confirmations),
            block_number,
            ..Default::default()
        }
    }

    /// Attach receipt details to a failed record.
    pub fn with_receipt(mut self, block_number: Option<u64>, fee: Option<String>) -> Self {
        self.block_number = block_number;
        self.fee = fee;
        self
    }
}
