//! Actor history.
//!
//! ```text
//! push(new) ──→ [new, r4, r3, r2, r1] ──truncate(capacity)──→ evicted: r1
//!                newest ........ oldest
//! ```

use crate::domain::errors::LedgerError;
use shared_types::{ActorId, LocalId, OperationRecord, OperationStatus, RecordPatch, TransitionError};

/// Result of applying a patch to one record.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The patch was applied; carries the updated record.
    Applied(OperationRecord),
    /// No record with that local id (evicted, cleared, or never existed).
    NotFound,
    /// The patch would violate the record invariants; nothing changed.
    Rejected(TransitionError),
}

impl UpdateOutcome {
    /// True when the record was changed.
    pub fn is_applied(&self) -> bool {
        matches!(self, UpdateOutcome::Applied(_))
    }
}

/// One actor's records, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActorHistory {
    records: Vec<OperationRecord>,
}

impl ActorHistory {
    /// Wrap records already in newest-first order.
    pub fn new(records: Vec<OperationRecord>) -> Self {
        Self { records }
    }

    /// Decode a persisted history. Missing data is an empty history; bytes
    /// that do not decode are reported, never discarded.
    pub fn decode(actor: &ActorId, bytes: Option<&[u8]>) -> Result<Self, LedgerError> {
        match bytes {
            None => Ok(Self::default()),
            Some(bytes) => serde_json::from_slice(bytes)
                .map(Self::new)
                .map_err(|e| LedgerError::Corrupted {
                    actor: actor.clone(),
                    message: e.to_string(),
                }),
        }
    }

    /// Encode for persistence.
    pub fn encode(&self) -> Result<Vec<u8>, LedgerError> {
        serde_json::to_vec(&self.records).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    /// Insert at the head and evict from the tail beyond `capacity`.
    ///
    /// Returns the evicted records, oldest last.
    pub fn push(&mut self, record: OperationRecord, capacity: usize) -> Vec<OperationRecord> {
        self.records.insert(0, record);
        if self.records.len() > capacity {
            self.records.split_off(capacity)
        } else {
            Vec::new()
        }
    }

    /// Apply a patch to the record with `local_id`.
    pub fn update(&mut self, local_id: &LocalId, patch: RecordPatch) -> UpdateOutcome {
        let Some(record) = self.records.iter_mut().find(|r| &r.local_id == local_id) else {
            return UpdateOutcome::NotFound;
        };
        match record.apply(patch) {
            Ok(()) => UpdateOutcome::Applied(record.clone()),
            Err(e) => UpdateOutcome::Rejected(e),
        }
    }

    /// Look up one record.
    pub fn get(&self, local_id: &LocalId) -> Option<&OperationRecord> {
        self.records.iter().find(|r| &r.local_id == local_id)
    }

    /// All records, newest first, optionally filtered by status.
    pub fn list(&self, status: Option<OperationStatus>) -> Vec<OperationRecord> {
        self.records
            .iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect()
    }

    /// The `count` newest records.
    pub fn recent(&self, count: usize) -> Vec<OperationRecord> {
        self.records.iter().take(count).cloned().collect()
    }

    /// Records not yet CONFIRMED or FAILED.
    pub fn pending_count(&self) -> usize {
        self.records.iter().filter(|r| !r.status.is_terminal()).count()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the history holds nothing.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
