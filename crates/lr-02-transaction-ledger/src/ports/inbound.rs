//! # Inbound Ports
//!
//! The API the Submission Gateway, the Confirmation Monitor and the runtime
//! facade use to read and write operation history.

use crate::domain::{LedgerError, UpdateOutcome};
use shared_types::{ActorId, LocalId, OperationKind, OperationRecord, OperationStatus, RecordPatch};

/// Operation history API - inbound port.
///
/// Object safe, so callers can hold an `Arc<dyn OperationLedger>` without
/// naming the storage backend.
pub trait OperationLedger: Send + Sync {
    /// Record a new PENDING_SUBMIT operation and persist it before returning.
    fn append(
        &self,
        actor: &ActorId,
        kind: OperationKind,
        details: serde_json::Value,
    ) -> Result<LocalId, LedgerError>;

    /// Apply a patch to one record.
    ///
    /// A missing record or a rejected transition is reported through the
    /// outcome; neither touches any other record.
    fn update(
        &self,
        actor: &ActorId,
        local_id: &LocalId,
        patch: RecordPatch,
    ) -> Result<UpdateOutcome, LedgerError>;

    /// Records newest first, optionally filtered by status.
    fn list(
        &self,
        actor: &ActorId,
        status: Option<OperationStatus>,
    ) -> Result<Vec<OperationRecord>, LedgerError>;

    /// Look up one record.
    fn get(&self, actor: &ActorId, local_id: &LocalId)
        -> Result<Option<OperationRecord>, LedgerError>;

    /// The `count` newest records.
    fn recent(&self, actor: &ActorId, count: usize) -> Result<Vec<OperationRecord>, LedgerError>;

    /// Records not yet terminal.
    fn pending_count(&self, actor: &ActorId) -> Result<usize, LedgerError>;

    /// Empty the actor's history.
    fn clear(&self, actor: &ActorId) -> Result<(), LedgerError>;
}
