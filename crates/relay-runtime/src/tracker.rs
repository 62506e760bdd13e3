//! # Operation Tracker
//!
//! The facade presentation code talks to. It owns one Submission Gateway,
//! one Confirmation Monitor and the status event bus, all sharing a single
//! Transaction Ledger.
//!
//! ```text
//! submit_and_track ──→ Gateway ──accepted──→ Monitor.start
//!                         │                      │
//!                         └──────── events ──────┴──→ bus ──→ subscribe(callback)
//! get_history ──→ Ledger ──→ HistoryEntry (display projection)
//! ```
//!
//! Subscriptions are at-least-once: a subscriber that arrives after the
//! terminal event still receives it, replayed from the stored record.

use crate::config::RelayConfig;
use lr_01_error_classifier::{ErrorClassifier, ErrorDisplay};
use lr_02_transaction_ledger::{LedgerError, OperationLedger};
use lr_03_submission_gateway::{
    Authorizer, GatewayError, LedgerSubmitter, OperationPayload, SubmissionApi, SubmissionGateway,
};
use lr_04_confirmation_monitor::{
    ConfirmationMonitor, MonitorApi, MonitorError, MonitorState, ReceiptSource,
};
use serde::{Deserialize, Serialize};
use shared_bus::{
    EventFilter, EventStream, InMemoryEventBus, RelayEvent, Subscription, SubscriptionError,
};
use shared_types::{
    short_hash, ActorId, LocalId, OperationKind, OperationRecord, OperationStatus,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Errors surfaced by the tracker. Expected failures never appear here;
/// they end up as FAILED records instead.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Submission could not be recorded.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Monitoring could not start.
    #[error(transparent)]
    Monitor(#[from] MonitorError),

    /// The transaction ledger failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// One row of an actor's history, ready to display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Caller-generated id.
    pub local_id: LocalId,
    /// Kind.
    pub kind: OperationKind,
    /// Human label for the kind.
    pub kind_label: String,
    /// Status.
    pub status: OperationStatus,
    /// Human label for the status.
    pub status_label: String,
    /// Unix millis.
    pub submitted_at: u64,
    /// Full ledger id.
    pub tx_id: Option<String>,
    /// Shortened ledger id.
    pub short_hash: Option<String>,
    /// Explorer link.
    pub explorer_url: Option<String>,
    /// Block depth at confirmation.
    pub confirmations: u64,
    /// Receipt block.
    pub block_number: Option<u64>,
    /// Receipt fee.
    pub fee: Option<String>,
    /// Failure, as shown to the user.
    pub error: Option<ErrorDisplay>,
    /// Opaque details recorded at submission.
    pub details: serde_json::Value,
}

impl HistoryEntry {
    /// Project a record for display.
    pub fn from_record(record: &OperationRecord, config: &RelayConfig) -> Self {
        Self {
            local_id: record.local_id.clone(),
            kind: record.kind,
            kind_label: record.kind.label().to_string(),
            status: record.status,
            status_label: record.status.label().to_string(),
            submitted_at: record.submitted_at,
            tx_id: record.id.clone(),
            short_hash: record.id.as_deref().map(short_hash),
            explorer_url: record.id.as_deref().map(|id| config.explorer_link(id)),
            confirmations: record.confirmations,
            block_number: record.block_number,
            fee: record.fee.clone(),
            error: record.error.as_ref().map(ErrorDisplay::from),
            details: record.details.clone(),
        }
    }
}

/// Keeps a status subscription alive. Dropping it unsubscribes.
pub struct SubscriptionHandle {
    local_id: LocalId,
    task: Option<JoinHandle<()>>,
}

impl SubscriptionHandle {
    /// Operation this subscription follows.
    pub fn local_id(&self) -> &LocalId {
        &self.local_id
    }

    /// False once the terminal event was delivered or the bus closed.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().map_or(false, |t| !t.is_finished())
    }

    /// Stop delivering events.
    pub fn unsubscribe(mut self) {
        self.abort();
    }

    /// Wait until the terminal event has been delivered.
    pub async fn finished(mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.abort();
    }
}

/// The Operation Tracker.
pub struct OperationTracker {
    ledger: Arc<dyn OperationLedger>,
    gateway: SubmissionGateway,
    monitor: ConfirmationMonitor,
    bus: Arc<InMemoryEventBus>,
    config: RelayConfig,
}

impl OperationTracker {
    /// Wire every subsystem around one ledger.
    pub fn new(
        ledger: Arc<dyn OperationLedger>,
        authorizer: Arc<dyn Authorizer>,
        submitter: Arc<dyn LedgerSubmitter>,
        receipts: Arc<dyn ReceiptSource>,
        config: RelayConfig,
    ) -> Self {
        let bus = Arc::new(InMemoryEventBus::new());
        let classifier = ErrorClassifier::default();
        let gateway = SubmissionGateway::new(
            ledger.clone(),
            authorizer,
            submitter,
            bus.clone(),
            config.gateway.clone(),
        )
        .with_classifier(classifier.clone());
        let monitor = ConfirmationMonitor::with_classifier(
            ledger.clone(),
            receipts,
            bus.clone(),
            config.monitor,
            classifier,
        );

        info!(
            poll_interval_ms = config.monitor.poll_interval.as_millis() as u64,
            max_polls = config.monitor.max_attempts,
            capacity = config.ledger.capacity,
            "Operation tracker ready"
        );

        Self {
            ledger,
            gateway,
            monitor,
            bus,
            config,
        }
    }

    /// Runtime configuration.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// The confirmation monitor.
    pub fn monitor(&self) -> &ConfirmationMonitor {
        &self.monitor
    }

    /// Submit an operation and, once the ledger accepts it, start watching it.
    ///
    /// Returns the local id whether the submission was accepted or failed;
    /// the outcome is on the record and on the event bus.
    pub async fn submit_and_track(
        &self,
        actor: &ActorId,
        kind: OperationKind,
        payload: OperationPayload,
    ) -> Result<LocalId, TrackerError> {
        let record = self.gateway.submit(actor, kind, payload).await?;
        if record.status != OperationStatus::PendingConfirm {
            return Ok(record.local_id);
        }
        match self.monitor.start(actor, &record.local_id).await {
            Ok(_) => {}
            // Evicted from the history while in flight: reported, not watched.
            Err(MonitorError::UnknownOperation(_)) => {
                warn!(
                    actor = %actor,
                    local_id = %record.local_id,
                    tx_id = ?record.id,
                    "Accepted operation no longer in history; not monitored"
                );
            }
            Err(e) => return Err(e.into()),
        }
        Ok(record.local_id)
    }

    /// History rows for `actor`, newest first.
    pub fn get_history(
        &self,
        actor: &ActorId,
        status: Option<OperationStatus>,
    ) -> Result<Vec<HistoryEntry>, TrackerError> {
        Ok(self
            .ledger
            .list(actor, status)?
            .iter()
            .map(|r| HistoryEntry::from_record(r, &self.config))
            .collect())
    }

    /// A single record.
    pub fn get(&self, actor: &ActorId, local_id: &LocalId) -> Result<Option<OperationRecord>, TrackerError> {
        Ok(self.ledger.get(actor, local_id)?)
    }

    /// Records still awaiting a verdict.
    pub fn pending_count(&self, actor: &ActorId) -> Result<usize, TrackerError> {
        Ok(self.ledger.pending_count(actor)?)
    }

    /// Monitor state for one operation.
    pub fn monitor_state(&self, local_id: &LocalId) -> MonitorState {
        self.monitor.state(local_id)
    }

    /// Deliver status events for one operation to `callback` until it
    /// reaches CONFIRMED or FAILED.
    ///
    /// If the operation is already terminal the terminal event is delivered
    /// immediately, so late subscribers never miss the outcome.
    pub fn subscribe<F>(&self, actor: &ActorId, local_id: &LocalId, callback: F) -> SubscriptionHandle
    where
        F: Fn(RelayEvent) + Send + Sync + 'static,
    {
        // Subscribe before reading the record so nothing published in
        // between is missed.
        let subscription = self.bus.subscribe(EventFilter::operation(local_id.clone()));

        if let Some(event) = self.replay(actor, local_id) {
            debug!(local_id = %local_id, "Replaying terminal status to late subscriber");
            callback(event);
            return SubscriptionHandle {
                local_id: local_id.clone(),
                task: None,
            };
        }

        let ledger = self.ledger.clone();
        let task = tokio::spawn(forward(
            subscription,
            ledger,
            actor.clone(),
            local_id.clone(),
            callback,
        ));
        SubscriptionHandle {
            local_id: local_id.clone(),
            task: Some(task),
        }
    }

    /// Stream of every event matching `filter`.
    pub fn events(&self, filter: EventFilter) -> EventStream {
        self.bus.event_stream(filter)
    }

    /// Re-poll every PENDING_CONFIRM record of `actor`.
    pub async fn resume(&self, actor: &ActorId) -> Result<Vec<LocalId>, TrackerError> {
        Ok(self.monitor.resume_pending(actor).await?)
    }

    /// Empty `actor`'s history, stopping any polling for it first.
    pub fn clear(&self, actor: &ActorId) -> Result<(), TrackerError> {
        for record in self.ledger.list(actor, None)? {
            self.monitor.reset(&record.local_id);
        }
        self.ledger.clear(actor)?;
        Ok(())
    }

    /// Stop every poll loop. Records stay PENDING_CONFIRM for `resume`.
    pub fn shutdown(&self) {
        let stopped = self.monitor.stop_all();
        info!(stopped, "Operation tracker shut down");
    }

    fn replay(&self, actor: &ActorId, local_id: &LocalId) -> Option<RelayEvent> {
        let record = self.ledger.get(actor, local_id).ok().flatten()?;
        terminal_event(actor, &record)
    }
}

async fn forward<F>(
    mut subscription: Subscription,
    ledger: Arc<dyn OperationLedger>,
    actor: ActorId,
    local_id: LocalId,
    callback: F,
) where
    F: Fn(RelayEvent) + Send + Sync + 'static,
{
    loop {
        match subscription.recv().await {
            Ok(event) => {
                let done = event.is_terminal();
                callback(event);
                if done {
                    return;
                }
            }
            Err(SubscriptionError::Lagged(_)) => {
                // Missed events; the stored record is authoritative.
                let record = ledger.get(&actor, &local_id).ok().flatten();
                if let Some(event) = record.and_then(|r| terminal_event(&actor, &r)) {
                    callback(event);
                    return;
                }
            }
            Err(SubscriptionError::Closed) => return,
        }
    }
}

/// The event a terminal record would have produced.
fn terminal_event(actor: &ActorId, record: &OperationRecord) -> Option<RelayEvent> {
    let actor = actor.clone();
    let local_id = record.local_id.clone();
    match (record.status, record.id.clone()) {
        (OperationStatus::Confirmed, Some(tx_id)) => Some(RelayEvent::Confirmed {
            actor,
            local_id,
            tx_id,
            confirmations: record.confirmations,
            block_number: record.block_number,
        }),
        (OperationStatus::Failed, Some(tx_id)) => Some(RelayEvent::Failed {
            actor,
            local_id,
            tx_id,
            error: record.error.clone()?,
        }),
        (OperationStatus::Failed, None) => Some(RelayEvent::SubmissionFailed {
            actor,
            local_id,
            error: record.error.clone()?,
        }),
        _ => None,
    }
}
