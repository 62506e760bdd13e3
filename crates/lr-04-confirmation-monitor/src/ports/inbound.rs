//! # Inbound Ports
//!
//! API exposed to the runtime facade.

use crate::domain::{MonitorError, MonitorState, PollSession};
use async_trait::async_trait;
use shared_types::{ActorId, LocalId};

/// Confirmation Monitor API - inbound port.
#[async_trait]
pub trait MonitorApi: Send + Sync {
    /// Begin polling for `local_id`. Idempotent while a session is polling.
    async fn start(&self, actor: &ActorId, local_id: &LocalId) -> Result<PollSession, MonitorError>;

    /// Cancel polling. Returns false if nothing was polling.
    fn stop(&self, local_id: &LocalId) -> bool;

    /// Stop and forget the session.
    fn reset(&self, local_id: &LocalId);

    /// Monitor state for one operation.
    fn state(&self, local_id: &LocalId) -> MonitorState;

    /// Snapshot of the session, if any.
    fn session(&self, local_id: &LocalId) -> Option<PollSession>;

    /// Start polling every PENDING_CONFIRM record of `actor` that has a ledger id.
    async fn resume_pending(&self, actor: &ActorId) -> Result<Vec<LocalId>, MonitorError>;
}
