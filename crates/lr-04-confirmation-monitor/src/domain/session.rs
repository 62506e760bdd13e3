//! Poll Session state machine.
//!
//! ```text
//! NOT_STARTED ──start──→ POLLING ──receipt ok──────→ SUCCEEDED
//!                          │  ├──receipt reverted──→ FAILED
//!                          │  └──attempts exhausted─→ TIMED_OUT
//!                          └──stop──→ STOPPED
//! ```
//!
//! A verdict keeps the session POLLING until [`PollSession::settle`] records
//! it, which the loop does only after the ledger holds the terminal status.
//!
//! Sessions live in memory only. A timed-out or stopped session leaves the
//! record PENDING_CONFIRM; starting again begins a fresh session.

use crate::domain::errors::QueryError;
use serde::{Deserialize, Serialize};
use shared_types::{ActorId, LedgerTxId, LocalId, Receipt, ReceiptOutcome};
use std::time::Duration;

/// Monitor state for one operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonitorState {
    /// No session exists.
    #[default]
    NotStarted,
    /// A poll loop is running.
    Polling,
    /// A receipt confirmed the operation.
    Succeeded,
    /// A receipt showed the operation failed.
    Failed,
    /// Attempts ran out with no verdict.
    TimedOut,
    /// Cancelled by `stop`.
    Stopped,
}

impl MonitorState {
    /// True while the loop is running.
    pub fn is_active(&self) -> bool {
        matches!(self, MonitorState::Polling)
    }
}

/// What the most recent poll saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollObservation {
    /// The ledger does not know the id yet.
    NotFound,
    /// A receipt exists but carries no verdict.
    Pending,
    /// Receipt shows success.
    Succeeded,
    /// Receipt shows revert or rejection.
    Failed,
    /// The lookup itself failed.
    QueryError,
}

/// What the loop should do after a poll.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Sleep and poll again.
    Continue,
    /// Record CONFIRMED from this receipt.
    Succeeded(Receipt),
    /// Record FAILED from this receipt.
    Failed(Receipt),
    /// Give up; the record stays PENDING_CONFIRM.
    TimedOut,
    /// The session is no longer polling; discard the result.
    Discard,
}

/// Ephemeral polling state for one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct PollSession {
    /// Operation.
    pub local_id: LocalId,
    /// Owning actor.
    pub actor: ActorId,
    /// Ledger id being polled.
    pub tx_id: LedgerTxId,
    /// Polls completed.
    pub attempts_made: u32,
    /// Polls allowed.
    pub max_attempts: u32,
    /// Delay between polls.
    pub interval: Duration,
    /// Most recent observation.
    pub last_status: Option<PollObservation>,
    /// Most recent lookup error.
    pub last_error: Option<String>,
    /// Current state.
    pub state: MonitorState,
}

impl PollSession {
    /// Begin polling.
    pub fn new(
        local_id: LocalId,
        actor: ActorId,
        tx_id: LedgerTxId,
        max_attempts: u32,
        interval: Duration,
    ) -> Self {
        Self {
            local_id,
            actor,
            tx_id,
            attempts_made: 0,
            max_attempts: max_attempts.max(1),
            interval,
            last_status: None,
            last_error: None,
            state: MonitorState::Polling,
        }
    }

    /// Fold one poll result into the session.
    pub fn observe(&mut self, result: Result<Option<Receipt>, QueryError>) -> Step {
        if !self.state.is_active() {
            return Step::Discard;
        }
        self.attempts_made += 1;

        let (observation, verdict) = match result {
            Ok(None) => (PollObservation::NotFound, None),
            Ok(Some(receipt)) => match receipt.outcome() {
                ReceiptOutcome::Pending => (PollObservation::Pending, None),
                ReceiptOutcome::Succeeded => {
                    (PollObservation::Succeeded, Some(Step::Succeeded(receipt)))
                }
                ReceiptOutcome::Failed => (PollObservation::Failed, Some(Step::Failed(receipt))),
            },
            Err(e) => {
                self.last_error = Some(e.to_string());
                (PollObservation::QueryError, None)
            }
        };
        self.last_status = Some(observation);

        match verdict {
            Some(step) => step,
            None if self.attempts_made >= self.max_attempts => {
                self.state = MonitorState::TimedOut;
                Step::TimedOut
            }
            None => Step::Continue,
        }
    }

    /// Record a verdict once it has been stored. False if the session was
    /// stopped in the meantime.
    pub fn settle(&mut self, state: MonitorState) -> bool {
        if self.state.is_active() {
            self.state = state;
            true
        } else {
            false
        }
    }

    /// Cancel. Returns false if the session was not polling.
    pub fn stop(&mut self) -> bool {
        if self.state.is_active() {
            self.state = MonitorState::Stopped;
            true
        } else {
            false
        }
    }
}
