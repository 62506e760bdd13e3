//! # Submission Gateway Service
//!
//! ```text
//! submit(actor, kind, payload)
//!   1. append PENDING_SUBMIT ──────────────────────────────┐
//!   2. policy check ──✗──┐                                 │
//!   3. normalize ─────✗──┤                                 │
//!   4. authorize ─────✗──┼──→ update FAILED (classified) ──┤
//!   5. submit ────────✗──┘                                 │
//!      └──✓──→ update PENDING_CONFIRM (ledger id) ─────────┴──→ publish event
//! ```
//!
//! If the record is evicted from the actor's history while the submit is in
//! flight, the outcome is applied to the copy taken after step 1 and
//! returned as-is, so an accepted ledger id is never dropped.

use crate::domain::{GatewayConfig, GatewayError, OperationPayload};
use crate::ports::inbound::SubmissionApi;
use crate::ports::outbound::{Authorizer, LedgerSubmitter};
use async_trait::async_trait;
use lr_01_error_classifier::{log_classified, ErrorClassifier};
use lr_02_transaction_ledger::{OperationLedger, UpdateOutcome};
use shared_bus::{EventPublisher, RelayEvent};
use shared_types::{
    ActorId, ClassifiedError, LedgerTxId, OperationKind, OperationRecord, RecordPatch,
};
use std::sync::Arc;
use tracing::{info, warn};

/// The Submission Gateway.
pub struct SubmissionGateway {
    ledger: Arc<dyn OperationLedger>,
    authorizer: Arc<dyn Authorizer>,
    submitter: Arc<dyn LedgerSubmitter>,
    publisher: Arc<dyn EventPublisher>,
    classifier: ErrorClassifier,
    config: GatewayConfig,
}

impl SubmissionGateway {
    /// Wire the gateway to its collaborators.
    pub fn new(
        ledger: Arc<dyn OperationLedger>,
        authorizer: Arc<dyn Authorizer>,
        submitter: Arc<dyn LedgerSubmitter>,
        publisher: Arc<dyn EventPublisher>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            ledger,
            authorizer,
            submitter,
            publisher,
            classifier: ErrorClassifier::default(),
            config,
        }
    }

    /// Replace the default classifier.
    pub fn with_classifier(mut self, classifier: ErrorClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Gateway configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn accept(
        &self,
        actor: &ActorId,
        draft: OperationRecord,
        tx_id: LedgerTxId,
    ) -> Result<OperationRecord, GatewayError> {
        let record = self.apply(actor, draft, RecordPatch::accepted(tx_id.clone()))?;
        info!(
            actor = %actor,
            local_id = %record.local_id,
            tx_id = %tx_id,
            "[lr-03] Submission accepted"
        );
        self.publisher
            .publish(RelayEvent::Submitted {
                actor: actor.clone(),
                local_id: record.local_id.clone(),
                tx_id,
            })
            .await;
        Ok(record)
    }

    async fn fail(
        &self,
        actor: &ActorId,
        draft: OperationRecord,
        error: ClassifiedError,
    ) -> Result<OperationRecord, GatewayError> {
        log_classified(&error, "submission");
        let record = self.apply(actor, draft, RecordPatch::failed(error.clone()))?;
        warn!(
            actor = %actor,
            local_id = %record.local_id,
            category = %error.category,
            "[lr-03] Submission failed"
        );
        self.publisher
            .publish(RelayEvent::SubmissionFailed {
                actor: actor.clone(),
                local_id: record.local_id.clone(),
                error,
            })
            .await;
        Ok(record)
    }

    /// Store the outcome. A record evicted meanwhile gets the patch applied
    /// to the draft instead.
    fn apply(
        &self,
        actor: &ActorId,
        draft: OperationRecord,
        patch: RecordPatch,
    ) -> Result<OperationRecord, GatewayError> {
        match self.ledger.update(actor, &draft.local_id, patch.clone())? {
            UpdateOutcome::Applied(record) => Ok(record),
            UpdateOutcome::NotFound => {
                warn!(
                    actor = %actor,
                    local_id = %draft.local_id,
                    "[lr-03] Record evicted during submission; outcome not persisted"
                );
                let mut detached = draft;
                detached.apply(patch)?;
                Ok(detached)
            }
            UpdateOutcome::Rejected(e) => Err(GatewayError::Transition(e)),
        }
    }

    /// Steps 2-5. Every refusal comes back classified.
    async fn send(
        &self,
        actor: &ActorId,
        kind: OperationKind,
        payload: &OperationPayload,
    ) -> Result<LedgerTxId, ClassifiedError> {
        self.config
            .policy
            .check(actor, kind)
            .map_err(|e| ClassifiedError::from(&e))?;

        let call = payload
            .normalize(kind, &self.config.targets)
            .map_err(|e| ClassifiedError::from(&e))?;

        let signed = self
            .authorizer
            .authorize(actor, &call)
            .await
            .map_err(|e| self.classifier.classify(&e))?;

        self.submitter
            .submit(&signed)
            .await
            .map_err(|e| self.classifier.classify(&e))
    }
}

#[async_trait]
impl SubmissionApi for SubmissionGateway {
    async fn submit(
        &self,
        actor: &ActorId,
        kind: OperationKind,
        payload: OperationPayload,
    ) -> Result<OperationRecord, GatewayError> {
        let details =
            serde_json::to_value(&payload).map_err(|e| GatewayError::Serialization(e.to_string()))?;
        let local_id = self.ledger.append(actor, kind, details.clone())?;
        let draft = match self.ledger.get(actor, &local_id)? {
            Some(record) => record,
            None => {
                let mut record = OperationRecord::new(kind, details, 0);
                record.local_id = local_id;
                record
            }
        };

        match self.send(actor, kind, &payload).await {
            Ok(tx_id) => self.accept(actor, draft, tx_id).await,
            Err(error) => self.fail(actor, draft, error).await,
        }
    }
}
