//! # Confirmation Monitor Service
//!
//! One background task per operation. Each task polls the receipt source,
//! folds the result into its [`PollSession`], and on a verdict writes the
//! terminal status to the transaction ledger before publishing the event.
//!
//! ```text
//! start ──→ poll ──→ observe ──Continue──→ sleep ─┬─→ poll ...
//!                       │                         └─ stop ──→ exit
//!                       ├─Succeeded──→ head ──→ CONFIRMED ──→ settle ──→ publish
//!                       ├─Failed─────→ classify ──→ FAILED ──→ settle ──→ publish
//!                       └─TimedOut───→ publish (record untouched)
//! ```
//!
//! A receipt that is included in a block but carries no verdict yet updates
//! the record's depth and block while it stays PENDING_CONFIRM.
//!
//! When a task exits its session moves out of the live map into a bounded
//! cache of finished sessions, so `state` keeps answering after the loop
//! is gone without the map growing for the life of the process.

use crate::domain::{MonitorConfig, MonitorError, MonitorState, PollSession, Step};
use crate::ports::inbound::MonitorApi;
use crate::ports::outbound::ReceiptSource;
use async_trait::async_trait;
use lr_01_error_classifier::{log_classified, ErrorClassifier};
use lr_02_transaction_ledger::{OperationLedger, UpdateOutcome};
use parking_lot::Mutex;
use shared_bus::{EventPublisher, RelayEvent};
use shared_types::{ActorId, LocalId, OperationStatus, Receipt, ReceiptOutcome, RecordPatch};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

struct SessionHandle {
    session: Arc<Mutex<PollSession>>,
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    fn snapshot(&self) -> PollSession {
        self.session.lock().clone()
    }

    fn stop(&self) -> bool {
        let stopped = self.session.lock().stop();
        let _ = self.stop.send(true);
        stopped
    }
}

/// Snapshots of sessions whose task has exited, oldest evicted first.
struct FinishedSessions {
    entries: HashMap<LocalId, PollSession>,
    order: VecDeque<LocalId>,
    capacity: usize,
}

impl FinishedSessions {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    fn insert(&mut self, session: PollSession) {
        let local_id = session.local_id.clone();
        if self.entries.insert(local_id.clone(), session).is_some() {
            self.order.retain(|id| *id != local_id);
        }
        self.order.push_back(local_id);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    fn get(&self, local_id: &LocalId) -> Option<PollSession> {
        self.entries.get(local_id).cloned()
    }

    fn remove(&mut self, local_id: &LocalId) -> bool {
        if self.entries.remove(local_id).is_some() {
            self.order.retain(|id| id != local_id);
            true
        } else {
            false
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

struct MonitorInner {
    ledger: Arc<dyn OperationLedger>,
    receipts: Arc<dyn ReceiptSource>,
    publisher: Arc<dyn EventPublisher>,
    classifier: ErrorClassifier,
    config: MonitorConfig,
    sessions: Mutex<HashMap<LocalId, SessionHandle>>,
    finished: Mutex<FinishedSessions>,
}

/// The Confirmation Monitor.
///
/// Cheap to clone; clones share sessions.
#[derive(Clone)]
pub struct ConfirmationMonitor {
    inner: Arc<MonitorInner>,
}

impl ConfirmationMonitor {
    /// Wire the monitor to its collaborators.
    pub fn new(
        ledger: Arc<dyn OperationLedger>,
        receipts: Arc<dyn ReceiptSource>,
        publisher: Arc<dyn EventPublisher>,
        config: MonitorConfig,
    ) -> Self {
        Self::with_classifier(ledger, receipts, publisher, config, ErrorClassifier::default())
    }

    /// Wire the monitor with a custom classifier.
    pub fn with_classifier(
        ledger: Arc<dyn OperationLedger>,
        receipts: Arc<dyn ReceiptSource>,
        publisher: Arc<dyn EventPublisher>,
        config: MonitorConfig,
        classifier: ErrorClassifier,
    ) -> Self {
        Self {
            inner: Arc::new(MonitorInner {
                ledger,
                receipts,
                publisher,
                classifier,
                config,
                sessions: Mutex::new(HashMap::new()),
                finished: Mutex::new(FinishedSessions::new(config.retained_sessions)),
            }),
        }
    }

    /// Monitor configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    /// Number of sessions currently polling.
    pub fn active_count(&self) -> usize {
        self.inner
            .sessions
            .lock()
            .values()
            .filter(|h| h.session.lock().state.is_active())
            .count()
    }

    /// Stop every session. Returns how many were polling.
    pub fn stop_all(&self) -> usize {
        let sessions = self.inner.sessions.lock();
        let stopped = sessions.values().filter(|h| h.stop()).count();
        if stopped > 0 {
            info!(stopped, "[lr-04] Stopped all sessions");
        }
        stopped
    }

    /// Sessions held in memory, live and finished.
    pub fn tracked_count(&self) -> usize {
        self.inner.sessions.lock().len() + self.inner.finished.lock().len()
    }

    /// Wait for the session's task to finish and return its final snapshot.
    pub async fn wait(&self, local_id: &LocalId) -> Option<PollSession> {
        let task = self
            .inner
            .sessions
            .lock()
            .get_mut(local_id)
            .and_then(|handle| handle.task.take());
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!(local_id = %local_id, error = %e, "[lr-04] Poll task aborted");
            }
        }
        self.session(local_id)
    }
}

#[async_trait]
impl MonitorApi for ConfirmationMonitor {
    async fn start(&self, actor: &ActorId, local_id: &LocalId) -> Result<PollSession, MonitorError> {
        let mut sessions = self.inner.sessions.lock();
        if let Some(existing) = sessions.get(local_id) {
            let snapshot = existing.snapshot();
            if snapshot.state.is_active() {
                debug!(local_id = %local_id, "[lr-04] Already polling");
                return Ok(snapshot);
            }
        }

        let record = self
            .inner
            .ledger
            .get(actor, local_id)?
            .ok_or_else(|| MonitorError::UnknownOperation(local_id.clone()))?;
        if record.status.is_terminal() {
            return Err(MonitorError::AlreadyTerminal {
                local_id: local_id.clone(),
                status: record.status,
            });
        }
        let tx_id = record
            .id
            .ok_or_else(|| MonitorError::MissingLedgerId(local_id.clone()))?;

        let session = PollSession::new(
            local_id.clone(),
            actor.clone(),
            tx_id,
            self.inner.config.max_attempts,
            self.inner.config.poll_interval,
        );
        let snapshot = session.clone();
        let session = Arc::new(Mutex::new(session));
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run(self.inner.clone(), session.clone(), stop_rx));
        self.inner.finished.lock().remove(local_id);

        info!(
            actor = %actor,
            local_id = %local_id,
            tx_id = %snapshot.tx_id,
            max_attempts = snapshot.max_attempts,
            "[lr-04] Monitoring started"
        );
        sessions.insert(
            local_id.clone(),
            SessionHandle {
                session,
                stop: stop_tx,
                task: Some(task),
            },
        );
        Ok(snapshot)
    }

    fn stop(&self, local_id: &LocalId) -> bool {
        let stopped = self
            .inner
            .sessions
            .lock()
            .get(local_id)
            .map(SessionHandle::stop)
            .unwrap_or(false);
        if stopped {
            info!(local_id = %local_id, "[lr-04] Monitoring stopped");
        }
        stopped
    }

    fn reset(&self, local_id: &LocalId) {
        let live = self.inner.sessions.lock().remove(local_id);
        if let Some(handle) = &live {
            handle.stop();
        }
        let finished = self.inner.finished.lock().remove(local_id);
        if live.is_some() || finished {
            debug!(local_id = %local_id, "[lr-04] Session reset");
        }
    }

    fn state(&self, local_id: &LocalId) -> MonitorState {
        self.session(local_id)
            .map(|s| s.state)
            .unwrap_or(MonitorState::NotStarted)
    }

    fn session(&self, local_id: &LocalId) -> Option<PollSession> {
        let live = self
            .inner
            .sessions
            .lock()
            .get(local_id)
            .map(SessionHandle::snapshot);
        live.or_else(|| self.inner.finished.lock().get(local_id))
    }

    async fn resume_pending(&self, actor: &ActorId) -> Result<Vec<LocalId>, MonitorError> {
        let pending = self
            .inner
            .ledger
            .list(actor, Some(OperationStatus::PendingConfirm))?;

        let mut started = Vec::new();
        for record in pending.into_iter().filter(|r| r.id.is_some()) {
            match self.start(actor, &record.local_id).await {
                Ok(_) => started.push(record.local_id),
                Err(e) => {
                    warn!(
                        actor = %actor,
                        local_id = %record.local_id,
                        error = %e,
                        "[lr-04] Skipping operation that can no longer be resumed"
                    );
                }
            }
        }
        if !started.is_empty() {
            info!(actor = %actor, count = started.len(), "[lr-04] Resumed pending operations");
        }
        Ok(started)
    }
}

async fn run(
    inner: Arc<MonitorInner>,
    session: Arc<Mutex<PollSession>>,
    stop: watch::Receiver<bool>,
) {
    poll(&inner, &session, stop).await;
    inner.retire(&session);
}

async fn poll(
    inner: &MonitorInner,
    session: &Arc<Mutex<PollSession>>,
    mut stop: watch::Receiver<bool>,
) {
    let (actor, local_id, tx_id, interval) = {
        let s = session.lock();
        (s.actor.clone(), s.local_id.clone(), s.tx_id.clone(), s.interval)
    };

    loop {
        if *stop.borrow() {
            return;
        }

        let result = inner.receipts.get_receipt(&tx_id).await;
        let active = session.lock().state.is_active();
        match &result {
            Err(e) => {
                warn!(local_id = %local_id, tx_id = %tx_id, error = %e, "[lr-04] Receipt lookup failed");
            }
            Ok(Some(receipt))
                if active
                    && receipt.outcome() == ReceiptOutcome::Pending
                    && receipt.block_number.is_some() =>
            {
                inner.progress(&actor, &local_id, receipt).await;
            }
            Ok(_) => {}
        }

        let step = session.lock().observe(result);
        match step {
            Step::Continue => {}
            Step::Discard => return,
            Step::Succeeded(receipt) => {
                inner.confirm(session, &tx_id, receipt).await;
                return;
            }
            Step::Failed(receipt) => {
                inner.fail(session, &tx_id, &receipt).await;
                return;
            }
            Step::TimedOut => {
                let attempts = session.lock().attempts_made;
                warn!(
                    local_id = %local_id,
                    tx_id = %tx_id,
                    attempts,
                    "[lr-04] Monitoring timed out; operation left pending"
                );
                inner
                    .publisher
                    .publish(RelayEvent::TimedOut {
                        actor,
                        local_id,
                        tx_id,
                        attempts,
                    })
                    .await;
                return;
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = stop.changed() => return,
        }
    }
}

impl MonitorInner {
    /// Store the depth of a receipt that is in a block but not yet final.
    async fn progress(&self, actor: &ActorId, local_id: &LocalId, receipt: &Receipt) {
        let head = match self.receipts.current_head().await {
            Ok(head) => head,
            Err(e) => {
                debug!(local_id = %local_id, error = %e, "[lr-04] Head lookup failed; depth not updated");
                return;
            }
        };
        let confirmations = receipt.confirmations(head);
        let patch = RecordPatch::progress(confirmations, receipt.block_number);
        match self.ledger.update(actor, local_id, patch) {
            Ok(UpdateOutcome::Applied(_)) => {
                debug!(
                    local_id = %local_id,
                    confirmations,
                    block_number = ?receipt.block_number,
                    "[lr-04] Receipt included; awaiting finality"
                );
            }
            Ok(_) => {}
            Err(e) => {
                warn!(local_id = %local_id, error = %e, "[lr-04] Failed to store receipt depth");
            }
        }
    }

    async fn confirm(&self, session: &Mutex<PollSession>, tx_id: &str, receipt: Receipt) {
        let (actor, local_id) = identity(session);
        let confirmations = match self.receipts.current_head().await {
            Ok(head) => receipt.confirmations(head),
            Err(e) => {
                warn!(local_id = %local_id, error = %e, "[lr-04] Head lookup failed; confirmations unknown");
                0
            }
        };
        let patch = RecordPatch::confirmed(confirmations, receipt.block_number, receipt.fee.clone());
        let stored = self.record(&actor, &local_id, patch);
        session.lock().settle(MonitorState::Succeeded);
        if !stored {
            return;
        }

        info!(
            actor = %actor,
            local_id = %local_id,
            tx_id = %tx_id,
            confirmations,
            "[lr-04] Operation confirmed"
        );
        self.publisher
            .publish(RelayEvent::Confirmed {
                actor,
                local_id,
                tx_id: tx_id.to_string(),
                confirmations,
                block_number: receipt.block_number,
            })
            .await;
    }

    async fn fail(&self, session: &Mutex<PollSession>, tx_id: &str, receipt: &Receipt) {
        let (actor, local_id) = identity(session);
        let error = self.classifier.receipt_failure(tx_id, receipt);
        log_classified(&error, "confirmation");

        let patch = RecordPatch::failed(error.clone())
            .with_receipt(receipt.block_number, receipt.fee.clone());
        let stored = self.record(&actor, &local_id, patch);
        session.lock().settle(MonitorState::Failed);
        if !stored {
            return;
        }

        self.publisher
            .publish(RelayEvent::Failed {
                actor,
                local_id,
                tx_id: tx_id.to_string(),
                error,
            })
            .await;
    }

    /// Move an exited session into the finished cache. A newer session
    /// started for the same operation is left alone.
    fn retire(&self, session: &Arc<Mutex<PollSession>>) {
        let snapshot = session.lock().clone();
        let mut sessions = self.sessions.lock();
        match sessions.get(&snapshot.local_id) {
            Some(handle) if Arc::ptr_eq(&handle.session, session) => {
                sessions.remove(&snapshot.local_id);
            }
            // Reset or replaced while the task was finishing.
            _ => return,
        }
        self.finished.lock().insert(snapshot);
    }

    /// Write a terminal patch. False when the record refused it.
    fn record(&self, actor: &ActorId, local_id: &LocalId, patch: RecordPatch) -> bool {
        match self.ledger.update(actor, local_id, patch) {
            Ok(UpdateOutcome::Applied(_)) => true,
            Ok(UpdateOutcome::NotFound) => {
                warn!(local_id = %local_id, "[lr-04] Record gone before verdict was stored");
                true
            }
            Ok(UpdateOutcome::Rejected(e)) => {
                warn!(local_id = %local_id, error = %e, "[lr-04] Verdict rejected by record");
                false
            }
            Err(e) => {
                error!(local_id = %local_id, error = %e, "[lr-04] Failed to store verdict");
                true
            }
        }
    }
}

fn identity(session: &Mutex<PollSession>) -> (ActorId, LocalId) {
    let s = session.lock();
    (s.actor.clone(), s.local_id.clone())
}
