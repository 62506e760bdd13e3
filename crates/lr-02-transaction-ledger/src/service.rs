//! # Transaction Ledger Service
//!
//! Implements `OperationLedger` over an injected `KeyValueStore`.

use crate::domain::{ActorHistory, LedgerConfig, LedgerError, UpdateOutcome};
use crate::ports::inbound::OperationLedger;
use crate::ports::outbound::{KeyValueStore, SystemTimeSource, TimeSource};
use parking_lot::{Mutex, RwLock};
use shared_types::{
    ActorId, LocalId, OperationKind, OperationRecord, OperationStatus, RecordPatch,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The Transaction Ledger.
pub struct TransactionLedger<S, T = SystemTimeSource>
where
    S: KeyValueStore,
    T: TimeSource,
{
    /// Persistence backend.
    store: RwLock<S>,
    /// Clock for `submitted_at`.
    time_source: T,
    /// Service configuration.
    config: LedgerConfig,
    /// One mutex per actor, guarding read-modify-write cycles. Entries live
    /// only while some call holds or waits on them.
    actor_locks: Mutex<HashMap<ActorId, Arc<Mutex<()>>>>,
}

impl<S: KeyValueStore> TransactionLedger<S, SystemTimeSource> {
    /// Create a ledger using the system clock.
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self::with_time_source(store, config, SystemTimeSource)
    }
}

impl<S, T> TransactionLedger<S, T>
where
    S: KeyValueStore,
    T: TimeSource,
{
    /// Create a ledger with an explicit clock.
    pub fn with_time_source(store: S, config: LedgerConfig, time_source: T) -> Self {
        Self {
            store: RwLock::new(store),
            time_source,
            config,
            actor_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Service configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Run `f` holding the actor's lock, then drop the lock entry if no
    /// other call is using it.
    fn with_actor_lock<R>(&self, actor: &ActorId, f: impl FnOnce() -> R) -> R {
        let lock = self
            .actor_locks
            .lock()
            .entry(actor.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = lock.lock();
            f()
        };

        let mut locks = self.actor_locks.lock();
        // The map and this call are the only holders.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(actor);
        }
        result
    }

    fn load(&self, actor: &ActorId) -> Result<ActorHistory, LedgerError> {
        let bytes = self.store.read().get(&actor.storage_key())?;
        ActorHistory::decode(actor, bytes.as_deref())
    }

    fn save(&self, actor: &ActorId, history: &ActorHistory) -> Result<(), LedgerError> {
        let bytes = history.encode()?;
        self.store.write().put(&actor.storage_key(), &bytes)?;
        Ok(())
    }
}

impl<S, T> OperationLedger for TransactionLedger<S, T>
where
    S: KeyValueStore,
    T: TimeSource,
{
    fn append(
        &self,
        actor: &ActorId,
        kind: OperationKind,
        details: serde_json::Value,
    ) -> Result<LocalId, LedgerError> {
        let (local_id, evicted) = self.with_actor_lock(actor, || {
            let mut history = self.load(actor)?;
            let record = OperationRecord::new(kind, details, self.time_source.now_millis());
            let local_id = record.local_id.clone();

            let evicted = history.push(record, self.config.effective_capacity());
            self.save(actor, &history)?;
            Ok::<_, LedgerError>((local_id, evicted))
        })?;

        for old in &evicted {
            debug!(
                actor = %actor,
                local_id = %old.local_id,
                status = %old.status,
                "[lr-02] Evicted oldest record"
            );
        }
        info!(actor = %actor, local_id = %local_id, kind = ?kind, "[lr-02] Recorded operation");
        Ok(local_id)
    }

    fn update(
        &self,
        actor: &ActorId,
        local_id: &LocalId,
        patch: RecordPatch,
    ) -> Result<UpdateOutcome, LedgerError> {
        let outcome = self.with_actor_lock(actor, || {
            let mut history = self.load(actor)?;
            let outcome = history.update(local_id, patch);
            if matches!(outcome, UpdateOutcome::Applied(_)) {
                self.save(actor, &history)?;
            }
            Ok::<_, LedgerError>(outcome)
        })?;

        match &outcome {
            UpdateOutcome::Applied(record) => {
                debug!(
                    actor = %actor,
                    local_id = %local_id,
                    status = %record.status,
                    "[lr-02] Updated record"
                );
            }
            UpdateOutcome::NotFound => {
                warn!(
                    actor = %actor,
                    local_id = %local_id,
                    "[lr-02] Update for unknown record ignored"
                );
            }
            UpdateOutcome::Rejected(e) => {
                warn!(
                    actor = %actor,
                    local_id = %local_id,
                    error = %e,
                    "[lr-02] Update rejected"
                );
            }
        }
        Ok(outcome)
    }

    fn list(
        &self,
        actor: &ActorId,
        status: Option<OperationStatus>,
    ) -> Result<Vec<OperationRecord>, LedgerError> {
        Ok(self.load(actor)?.list(status))
    }

    fn get(
        &self,
        actor: &ActorId,
        local_id: &LocalId,
    ) -> Result<Option<OperationRecord>, LedgerError> {
        Ok(self.load(actor)?.get(local_id).cloned())
    }

    fn recent(&self, actor: &ActorId, count: usize) -> Result<Vec<OperationRecord>, LedgerError> {
        Ok(self.load(actor)?.recent(count))
    }

    fn pending_count(&self, actor: &ActorId) -> Result<usize, LedgerError> {
        Ok(self.load(actor)?.pending_count())
    }

    fn clear(&self, actor: &ActorId) -> Result<(), LedgerError> {
        self.with_actor_lock(actor, || self.store.write().delete(&actor.storage_key()))?;
        info!(actor = %actor, "[lr-02] Cleared history");
        Ok(())
    }
}
