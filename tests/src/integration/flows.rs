//! # Operation Lifecycle Flows
//!
//! Drives the Submission Gateway (lr-03), Confirmation Monitor (lr-04) and
//! Transaction Ledger (lr-02) together through the Operation Tracker, with
//! the Error Classifier (lr-01) deciding every failure.
//!
//! ## Flows Tested:
//!
//! 1. **Submit → Confirm**: accepted, polled until a receipt, confirmations from head
//! 2. **Refused locally**: policy and validation failures never reach the ledger
//! 3. **Refused remotely**: transport and revert failures end FAILED and classified
//! 4. **Timeout → Resume**: polling gives up, the record stays pending, a later resume confirms

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    use lr_03_submission_gateway::{OperationPayload, ProtocolAllocation, SubmitError};
    use lr_04_confirmation_monitor::MonitorState;
    use shared_bus::{EventFilter, RelayEvent};
    use shared_types::{ErrorCategory, OperationKind, OperationStatus, Receipt};

    use crate::integration::harness::{
        balanced_allocation, bot, collector, deposit, mock_tx_id, owner, stranger, RelayHarness,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

    fn full_allocation() -> OperationPayload {
        OperationPayload::AllocationUpdate {
            allocations: vec![ProtocolAllocation {
                protocol: "ekubo".into(),
                bps: 10_000,
            }],
        }
    }

    // =============================================================================
    // INTEGRATION TESTS
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_deposit_submitted_then_confirmed() {
        let h = RelayHarness::new();
        let tx_id = mock_tx_id(1);
        h.receipts.script(
            tx_id.clone(),
            vec![Ok(None), Ok(None), Ok(Some(Receipt::succeeded(100)))],
        );
        h.receipts.set_head(102);
        let mut events = h.tracker.events(EventFilter::actor(owner()));

        let local_id = h
            .tracker
            .submit_and_track(&owner(), OperationKind::Deposit, deposit(5_000))
            .await
            .unwrap();

        let first = timeout(EVENT_TIMEOUT, events.next()).await.unwrap().unwrap();
        assert!(matches!(first, RelayEvent::Submitted { ref tx_id, .. } if *tx_id == mock_tx_id(1)));

        let second = timeout(EVENT_TIMEOUT, events.next()).await.unwrap().unwrap();
        match second {
            RelayEvent::Confirmed {
                local_id: confirmed,
                confirmations,
                block_number,
                ..
            } => {
                assert_eq!(confirmed, local_id);
                assert_eq!(confirmations, 2);
                assert_eq!(block_number, Some(100));
            }
            other => panic!("expected Confirmed, got {:?}", other),
        }

        let record = h.ledger.get(&owner(), &local_id).unwrap().unwrap();
        assert_eq!(record.status, OperationStatus::Confirmed);
        assert_eq!(record.id.as_deref(), Some(tx_id.as_str()));
        assert_eq!(record.confirmations, 2);
        assert_eq!(h.receipts.polls(&tx_id), 3);
        assert_eq!(h.tracker.monitor_state(&local_id), MonitorState::Succeeded);
        assert_eq!(h.tracker.pending_count(&owner()).unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_automation_identity_may_rebalance() {
        let h = RelayHarness::new();
        h.receipts
            .script(mock_tx_id(1), vec![Ok(Some(Receipt::succeeded(7)))]);

        let local_id = h
            .tracker
            .submit_and_track(&bot(), OperationKind::AllocationUpdate, balanced_allocation())
            .await
            .unwrap();
        h.tracker.monitor().wait(&local_id).await;

        let submissions = h.remote.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].call.entrypoint, "update_allocation");
        assert_eq!(submissions[0].call.calldata, vec!["6000", "4000"]);

        let history = h.tracker.get_history(&bot(), None).unwrap();
        assert_eq!(history[0].status, OperationStatus::Confirmed);
        assert_eq!(history[0].kind, OperationKind::AllocationUpdate);
    }

    #[tokio::test]
    async fn test_unauthorized_rebalance_never_reaches_ledger() {
        let h = RelayHarness::new();
        let mut events = h.tracker.events(EventFilter::all());

        let local_id = h
            .tracker
            .submit_and_track(&stranger(), OperationKind::AllocationUpdate, full_allocation())
            .await
            .unwrap();

        assert_eq!(h.remote.submit_count(), 0);
        assert_eq!(h.tracker.monitor_state(&local_id), MonitorState::NotStarted);

        let record = h.ledger.get(&stranger(), &local_id).unwrap().unwrap();
        assert_eq!(record.status, OperationStatus::Failed);
        assert!(record.id.is_none());
        let error = record.error.unwrap();
        assert_eq!(error.category, ErrorCategory::Validation);
        assert!(!error.retryable);

        let event = timeout(EVENT_TIMEOUT, events.next()).await.unwrap().unwrap();
        assert!(matches!(event, RelayEvent::SubmissionFailed { .. }));
    }

    #[tokio::test]
    async fn test_allocation_not_summing_to_total_is_rejected() {
        let h = RelayHarness::new();
        let payload = OperationPayload::AllocationUpdate {
            allocations: vec![ProtocolAllocation {
                protocol: "nostra".into(),
                bps: 5_000,
            }],
        };

        let local_id = h
            .tracker
            .submit_and_track(&owner(), OperationKind::AllocationUpdate, payload)
            .await
            .unwrap();

        let record = h.ledger.get(&owner(), &local_id).unwrap().unwrap();
        assert_eq!(record.status, OperationStatus::Failed);
        assert_eq!(record.error.unwrap().category, ErrorCategory::Validation);
        assert_eq!(h.remote.submit_count(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_is_retryable_network_error() {
        let h = RelayHarness::new();
        h.remote
            .push_result(Err(SubmitError::Transport("Connection refused".into())));

        let local_id = h
            .tracker
            .submit_and_track(
                &owner(),
                OperationKind::Withdraw,
                OperationPayload::Withdraw { amount: 42 },
            )
            .await
            .unwrap();

        let history = h.tracker.get_history(&owner(), None).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].local_id, local_id);
        assert_eq!(history[0].status, OperationStatus::Failed);
        assert!(history[0].tx_id.is_none());

        let record = h.ledger.get(&owner(), &local_id).unwrap().unwrap();
        let error = record.error.unwrap();
        assert_eq!(error.category, ErrorCategory::Network);
        assert!(error.retryable);
        assert_eq!(h.tracker.monitor().active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reverted_receipt_fails_operation() {
        let h = RelayHarness::new();
        h.receipts.script(
            mock_tx_id(1),
            vec![Ok(None), Ok(Some(Receipt::reverted(55, "Insufficient liquidity")))],
        );

        let local_id = h
            .tracker
            .submit_and_track(&owner(), OperationKind::YieldAccrual, OperationPayload::YieldAccrual)
            .await
            .unwrap();
        let (seen, callback) = collector();
        let handle = h.tracker.subscribe(&owner(), &local_id, callback);
        timeout(EVENT_TIMEOUT, handle.finished()).await.unwrap();

        let events = seen.lock().clone();
        match events.last() {
            Some(RelayEvent::Failed { error, tx_id, .. }) => {
                assert_eq!(*tx_id, mock_tx_id(1));
                assert_eq!(error.category, ErrorCategory::Transaction);
                assert!(error.technical_message.contains("Insufficient liquidity"));
            }
            other => panic!("expected Failed, got {:?}", other),
        }

        let record = h.ledger.get(&owner(), &local_id).unwrap().unwrap();
        assert_eq!(record.status, OperationStatus::Failed);
        assert_eq!(record.block_number, Some(55));
        assert_eq!(h.tracker.monitor_state(&local_id), MonitorState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_leaves_pending_until_resume() {
        let h = RelayHarness::new();
        let max_attempts = h.tracker.config().monitor.max_attempts;

        let local_id = h
            .tracker
            .submit_and_track(&owner(), OperationKind::Deposit, deposit(1))
            .await
            .unwrap();
        let (seen, callback) = collector();
        let handle = h.tracker.subscribe(&owner(), &local_id, callback);

        let session = h.tracker.monitor().wait(&local_id).await.unwrap();
        assert_eq!(session.state, MonitorState::TimedOut);
        assert_eq!(session.attempts_made, max_attempts);
        assert_eq!(h.receipts.polls(&mock_tx_id(1)), max_attempts);

        let record = h.ledger.get(&owner(), &local_id).unwrap().unwrap();
        assert_eq!(record.status, OperationStatus::PendingConfirm);

        // A timeout is reported but does not end the subscription.
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(seen
            .lock()
            .iter()
            .any(|e| matches!(e, RelayEvent::TimedOut { .. })));
        assert!(handle.is_active());

        h.receipts
            .script(mock_tx_id(1), vec![Ok(Some(Receipt::succeeded(3)))]);
        h.receipts.set_head(3);
        let resumed = h.tracker.resume(&owner()).await.unwrap();
        assert_eq!(resumed, vec![local_id.clone()]);

        timeout(EVENT_TIMEOUT, handle.finished()).await.unwrap();
        assert!(matches!(
            seen.lock().last(),
            Some(RelayEvent::Confirmed { confirmations: 0, .. })
        ));
        let record = h.ledger.get(&owner(), &local_id).unwrap().unwrap();
        assert_eq!(record.status, OperationStatus::Confirmed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_filters_by_status() {
        let h = RelayHarness::new();
        h.receipts
            .script(mock_tx_id(1), vec![Ok(Some(Receipt::succeeded(1)))]);

        let confirmed = h
            .tracker
            .submit_and_track(&owner(), OperationKind::Deposit, deposit(10))
            .await
            .unwrap();
        h.tracker.monitor().wait(&confirmed).await;
        let failed = h
            .tracker
            .submit_and_track(&owner(), OperationKind::Deposit, deposit(0))
            .await
            .unwrap();

        let all = h.tracker.get_history(&owner(), None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].local_id, failed);
        assert_eq!(all[1].local_id, confirmed);

        let only_failed = h
            .tracker
            .get_history(&owner(), Some(OperationStatus::Failed))
            .unwrap();
        assert_eq!(only_failed.len(), 1);
        assert_eq!(only_failed[0].local_id, failed);
        assert_eq!(
            only_failed[0].error.as_ref().unwrap().title,
            "VALIDATION Error"
        );
    }
}
