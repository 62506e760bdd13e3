//! # Restart Recovery
//!
//! Runs the tracker over a RocksDB directory, tears it down mid-flight and
//! brings a fresh tracker up over the same directory.
//!
//! ## Guarantees Tested:
//!
//! 1. PENDING_CONFIRM records survive a restart and are re-polled by `resume`
//! 2. Terminal records survive a restart and are never polled again
//! 3. The store can enumerate every actor with a history

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    use lr_03_submission_gateway::MockLedger;
    use lr_04_confirmation_monitor::{MockReceiptSource, MonitorState};
    use relay_runtime::adapters::{RocksDbConfig, RocksDbStore};
    use relay_runtime::RelayConfig;
    use shared_types::{LocalId, OperationKind, OperationStatus, Receipt};

    use crate::integration::harness::{deposit, mock_tx_id, owner, stranger, RelayHarness};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn open(dir: &Path) -> RocksDbStore {
        RocksDbStore::open(RocksDbConfig::for_testing(dir)).unwrap()
    }

    /// A tracker over `dir`, sharing the given ledger endpoints.
    fn boot(
        dir: &Path,
        remote: &Arc<MockLedger>,
        receipts: &Arc<MockReceiptSource>,
    ) -> RelayHarness {
        RelayHarness::with_endpoints(
            open(dir),
            RelayConfig::for_testing(),
            remote.clone(),
            receipts.clone(),
        )
    }

    /// Stop polling and let every task release the store.
    async fn shut_down(h: RelayHarness, ids: &[LocalId]) {
        h.tracker.shutdown();
        for id in ids {
            h.tracker.monitor().wait(id).await;
        }
        drop(h);
    }

    // =============================================================================
    // INTEGRATION TESTS
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_pending_operation_resumes_after_restart() {
        let dir = TempDir::new().unwrap();
        let remote = Arc::new(MockLedger::new());
        let receipts = Arc::new(MockReceiptSource::new());

        let h = boot(dir.path(), &remote, &receipts);
        let local_id = h
            .tracker
            .submit_and_track(&owner(), OperationKind::Deposit, deposit(250))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert!(receipts.polls(&mock_tx_id(1)) >= 2);
        shut_down(h, &[local_id.clone()]).await;

        let h = boot(dir.path(), &remote, &receipts);
        let record = h.tracker.get(&owner(), &local_id).unwrap().unwrap();
        assert_eq!(record.status, OperationStatus::PendingConfirm);
        assert_eq!(record.id.as_deref(), Some(mock_tx_id(1).as_str()));
        assert_eq!(h.tracker.monitor_state(&local_id), MonitorState::NotStarted);

        receipts.script(mock_tx_id(1), vec![Ok(Some(Receipt::succeeded(40)))]);
        receipts.set_head(41);
        let resumed = h.tracker.resume(&owner()).await.unwrap();
        assert_eq!(resumed, vec![local_id.clone()]);

        let session = h.tracker.monitor().wait(&local_id).await.unwrap();
        assert_eq!(session.state, MonitorState::Succeeded);
        shut_down(h, &[]).await;

        // The verdict itself was persisted.
        let h = boot(dir.path(), &remote, &receipts);
        let record = h.tracker.get(&owner(), &local_id).unwrap().unwrap();
        assert_eq!(record.status, OperationStatus::Confirmed);
        assert_eq!(record.confirmations, 1);
        assert_eq!(record.block_number, Some(40));
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_records_are_not_polled_after_restart() {
        let dir = TempDir::new().unwrap();
        let remote = Arc::new(MockLedger::new());
        let receipts = Arc::new(MockReceiptSource::new());
        receipts.script(mock_tx_id(1), vec![Ok(Some(Receipt::succeeded(5)))]);

        let h = boot(dir.path(), &remote, &receipts);
        let confirmed = h
            .tracker
            .submit_and_track(&owner(), OperationKind::Deposit, deposit(1))
            .await
            .unwrap();
        h.tracker.monitor().wait(&confirmed).await;
        let failed = h
            .tracker
            .submit_and_track(&owner(), OperationKind::Deposit, deposit(0))
            .await
            .unwrap();
        shut_down(h, &[]).await;

        let polls_before = receipts.total_polls();
        let h = boot(dir.path(), &remote, &receipts);
        assert!(h.tracker.resume(&owner()).await.unwrap().is_empty());
        assert_eq!(receipts.total_polls(), polls_before);

        let history = h.tracker.get_history(&owner(), None).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].local_id, failed);
        assert_eq!(history[0].status, OperationStatus::Failed);
        assert_eq!(history[1].local_id, confirmed);
        assert_eq!(history[1].status, OperationStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_store_lists_every_actor_after_restart() {
        let dir = TempDir::new().unwrap();
        let remote = Arc::new(MockLedger::new());
        let receipts = Arc::new(MockReceiptSource::new());

        let h = boot(dir.path(), &remote, &receipts);
        h.tracker
            .submit_and_track(&owner(), OperationKind::Deposit, deposit(0))
            .await
            .unwrap();
        h.tracker
            .submit_and_track(&stranger(), OperationKind::Deposit, deposit(0))
            .await
            .unwrap();
        shut_down(h, &[]).await;

        let store = open(dir.path());
        let mut actors = store.actors().unwrap();
        actors.sort();
        let mut expected = vec![owner(), stranger()];
        expected.sort();
        assert_eq!(actors, expected);
    }
}
