//! # Outbound Ports
//!
//! The signing collaborator and the external ledger's submit capability.

use crate::domain::{AuthorizeError, LedgerCall, SignedSubmission, SubmitError};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{ActorId, LedgerTxId};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// Signing collaborator - outbound port.
///
/// Turns a call into something the ledger will accept from `actor`.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Authorize `call` on behalf of `actor`.
    async fn authorize(
        &self,
        actor: &ActorId,
        call: &LedgerCall,
    ) -> Result<SignedSubmission, AuthorizeError>;
}

/// External ledger submit capability - outbound port.
#[async_trait]
pub trait LedgerSubmitter: Send + Sync {
    /// Send a signed submission; returns the ledger-issued id.
    async fn submit(&self, signed: &SignedSubmission) -> Result<LedgerTxId, SubmitError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock signer. Approves everything unless told to reject.
#[derive(Default)]
pub struct MockAuthorizer {
    rejection: Option<AuthorizeError>,
    calls: AtomicU64,
}

impl MockAuthorizer {
    /// Approve every call.
    pub fn approving() -> Self {
        Self::default()
    }

    /// Refuse every call with `error`.
    pub fn rejecting(error: AuthorizeError) -> Self {
        Self {
            rejection: Some(error),
            calls: AtomicU64::new(0),
        }
    }

    /// Number of authorization requests seen.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authorizer for MockAuthorizer {
    async fn authorize(
        &self,
        actor: &ActorId,
        call: &LedgerCall,
    ) -> Result<SignedSubmission, AuthorizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.rejection {
            return Err(err.clone());
        }
        Ok(SignedSubmission {
            sender: actor.clone(),
            call: call.clone(),
            signature: vec!["0x1".into(), "0x2".into()],
            nonce: "0x0".into(),
            max_fee: "0x0".into(),
        })
    }
}

/// Mock ledger submit endpoint.
///
/// Scripted results are consumed in order; once exhausted every submission
/// is accepted with a fresh sequential id.
#[derive(Default)]
pub struct MockLedger {
    scripted: Mutex<VecDeque<Result<LedgerTxId, SubmitError>>>,
    submissions: Mutex<Vec<SignedSubmission>>,
    counter: AtomicU64,
}

impl MockLedger {
    /// Ledger that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next submission.
    pub fn push_result(&self, result: Result<LedgerTxId, SubmitError>) {
        self.scripted.lock().push_back(result);
    }

    /// Number of submissions received.
    pub fn submit_count(&self) -> usize {
        self.submissions.lock().len()
    }

    /// Submissions received, in order.
    pub fn submissions(&self) -> Vec<SignedSubmission> {
        self.submissions.lock().clone()
    }
}

#[async_trait]
impl LedgerSubmitter for MockLedger {
    async fn submit(&self, signed: &SignedSubmission) -> Result<LedgerTxId, SubmitError> {
        self.submissions.lock().push(signed.clone());
        if let Some(result) = self.scripted.lock().pop_front() {
            return result;
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("0x{:064x}", n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call() -> LedgerCall {
        LedgerCall::new("0x1", "accrue_yields", Vec::new())
    }

    #[tokio::test]
    async fn test_mock_authorizer_signs() {
        let signer = MockAuthorizer::approving();
        let signed = signer.authorize(&ActorId::new("0xa"), &call()).await.unwrap();
        assert_eq!(signed.sender, ActorId::new("0xa"));
        assert_eq!(signer.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_authorizer_rejects() {
        let signer = MockAuthorizer::rejecting(AuthorizeError::Rejected("declined".into()));
        assert!(signer.authorize(&ActorId::new("0xa"), &call()).await.is_err());
    }

    #[test]
    fn test_mock_ledger_records_submissions() {
        let ledger = MockLedger::new();
        let signed = SignedSubmission {
            sender: ActorId::new("0xa"),
            call: call(),
            signature: Vec::new(),
            nonce: "0x0".into(),
            max_fee: "0x0".into(),
        };
        let id = tokio_test::block_on(ledger.submit(&signed)).unwrap();
        assert_eq!(id, format!("0x{:064x}", 1));
        assert_eq!(ledger.submissions(), vec![signed]);
    }

    #[tokio::test]
    async fn test_mock_ledger_script_then_default() {
        let ledger = MockLedger::new();
        ledger.push_result(Err(SubmitError::Transport("down".into())));

        let signed = MockAuthorizer::approving()
            .authorize(&ActorId::new("0xa"), &call())
            .await
            .unwrap();

        assert!(ledger.submit(&signed).await.is_err());
        let id = ledger.submit(&signed).await.unwrap();
        assert!(id.starts_with("0x"));
        assert_eq!(id.len(), 66);
        assert_eq!(ledger.submit_count(), 2);
    }
}
