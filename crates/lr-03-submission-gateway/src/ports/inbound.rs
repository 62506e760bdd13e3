//! # Inbound Ports
//!
//! API exposed to the runtime facade.

use crate::domain::{GatewayError, OperationPayload};
use async_trait::async_trait;
use shared_types::{ActorId, OperationKind, OperationRecord};

/// Submission API - inbound port.
#[async_trait]
pub trait SubmissionApi: Send + Sync {
    /// Record, validate, sign and submit one operation.
    ///
    /// Returns the record in PENDING_CONFIRM (accepted) or FAILED (refused at
    /// any step). Never retries.
    async fn submit(
        &self,
        actor: &ActorId,
        kind: OperationKind,
        payload: OperationPayload,
    ) -> Result<OperationRecord, GatewayError>;
}
