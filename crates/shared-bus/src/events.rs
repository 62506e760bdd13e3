//! # Relay Events
//!
//! Lifecycle notifications and subscription filters.

use serde::{Deserialize, Serialize};
use shared_types::{ActorId, ClassifiedError, LedgerTxId, LocalId, OperationStatus};

/// Subsystem id of the Submission Gateway.
pub const SOURCE_GATEWAY: u8 = 3;
/// Subsystem id of the Confirmation Monitor.
pub const SOURCE_MONITOR: u8 = 4;

/// Event topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Submission outcomes.
    Submission,
    /// Confirmation outcomes.
    Confirmation,
    /// Wildcard.
    All,
}

/// An operation lifecycle notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RelayEvent {
    /// The ledger accepted the submission.
    Submitted {
        /// Owning actor.
        actor: ActorId,
        /// Operation.
        local_id: LocalId,
        /// Ledger-issued id.
        tx_id: LedgerTxId,
    },
    /// The submission was refused (policy, validation, signer or ledger).
    SubmissionFailed {
        /// Owning actor.
        actor: ActorId,
        /// Operation.
        local_id: LocalId,
        /// Why.
        error: ClassifiedError,
    },
    /// A receipt confirmed the operation.
    Confirmed {
        /// Owning actor.
        actor: ActorId,
        /// Operation.
        local_id: LocalId,
        /// Ledger-issued id.
        tx_id: LedgerTxId,
        /// Depth below head.
        confirmations: u64,
        /// Receipt block.
        block_number: Option<u64>,
    },
    /// A receipt showed the operation reverted or was rejected.
    Failed {
        /// Owning actor.
        actor: ActorId,
        /// Operation.
        local_id: LocalId,
        /// Ledger-issued id.
        tx_id: LedgerTxId,
        /// Why.
        error: ClassifiedError,
    },
    /// Polling gave up; the operation is still pending on the ledger.
    TimedOut {
        /// Owning actor.
        actor: ActorId,
        /// Operation.
        local_id: LocalId,
        /// Ledger-issued id.
        tx_id: LedgerTxId,
        /// Polls made.
        attempts: u32,
    },
}

impl RelayEvent {
    /// Topic of this event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            RelayEvent::Submitted { .. } | RelayEvent::SubmissionFailed { .. } => {
                EventTopic::Submission
            }
            RelayEvent::Confirmed { .. } | RelayEvent::Failed { .. } | RelayEvent::TimedOut { .. } => {
                EventTopic::Confirmation
            }
        }
    }

    /// Subsystem that emitted this event.
    #[must_use]
    pub fn source_subsystem(&self) -> u8 {
        match self.topic() {
            EventTopic::Submission => SOURCE_GATEWAY,
            _ => SOURCE_MONITOR,
        }
    }

    /// Operation this event is about.
    #[must_use]
    pub fn local_id(&self) -> &LocalId {
        match self {
            RelayEvent::Submitted { local_id, .. }
            | RelayEvent::SubmissionFailed { local_id, .. }
            | RelayEvent::Confirmed { local_id, .. }
            | RelayEvent::Failed { local_id, .. }
            | RelayEvent::TimedOut { local_id, .. } => local_id,
        }
    }

    /// Actor owning the operation.
    #[must_use]
    pub fn actor(&self) -> &ActorId {
        match self {
            RelayEvent::Submitted { actor, .. }
            | RelayEvent::SubmissionFailed { actor, .. }
            | RelayEvent::Confirmed { actor, .. }
            | RelayEvent::Failed { actor, .. }
            | RelayEvent::TimedOut { actor, .. } => actor,
        }
    }

    /// Record status implied by this event. A timeout implies no change.
    #[must_use]
    pub fn status(&self) -> Option<OperationStatus> {
        match self {
            RelayEvent::Submitted { .. } => Some(OperationStatus::PendingConfirm),
            RelayEvent::SubmissionFailed { .. } | RelayEvent::Failed { .. } => {
                Some(OperationStatus::Failed)
            }
            RelayEvent::Confirmed { .. } => Some(OperationStatus::Confirmed),
            RelayEvent::TimedOut { .. } => None,
        }
    }

    /// True when the record reached CONFIRMED or FAILED.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status().map_or(false, |s| s.is_terminal())
    }
}

/// Subscription filter.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Restrict to one operation.
    pub local_id: Option<LocalId>,
    /// Restrict to one actor.
    pub actor: Option<ActorId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            ..Default::default()
        }
    }

    /// Create a filter for a single operation.
    #[must_use]
    pub fn operation(local_id: LocalId) -> Self {
        Self {
            local_id: Some(local_id),
            ..Default::default()
        }
    }

    /// Create a filter for one actor's operations.
    #[must_use]
    pub fn actor(actor: ActorId) -> Self {
        Self {
            actor: Some(actor),
            ..Default::default()
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &RelayEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let operation_match = self
            .local_id
            .as_ref()
            .map_or(true, |id| id == event.local_id());

        let actor_match = self.actor.as_ref().map_or(true, |a| a == event.actor());

        topic_match && operation_match && actor_match
    }
}
