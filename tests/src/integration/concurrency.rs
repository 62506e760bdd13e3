//! # Concurrent Operations
//!
//! Many submissions and confirmations racing on the same ledger. Every
//! write to an actor history is a read-modify-write, so these tests catch
//! lost updates and cross-actor interference.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio::time::timeout;

    use relay_runtime::RelayConfig;
    use shared_bus::RelayEvent;
    use shared_types::{ActorId, OperationKind, OperationStatus, Receipt};

    use crate::integration::harness::{collector, deposit, mock_tx_id, owner, RelayHarness};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const TEST_TIMEOUT: Duration = Duration::from_secs(10);

    fn harness_with_capacity(capacity: usize) -> RelayHarness {
        let mut config = RelayConfig::for_testing();
        config.ledger.capacity = capacity;
        RelayHarness::with_config(config)
    }

    // =============================================================================
    // INTEGRATION TESTS
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_lose_no_updates() {
        const OPS: u64 = 20;
        let h = harness_with_capacity(50);
        for n in 1..=OPS {
            h.receipts
                .script(mock_tx_id(n), vec![Ok(None), Ok(Some(Receipt::succeeded(n)))]);
        }

        let mut tasks = Vec::new();
        for i in 0..OPS {
            let tracker = h.tracker.clone();
            tasks.push(tokio::spawn(async move {
                tracker
                    .submit_and_track(&owner(), OperationKind::Deposit, deposit(u128::from(i) + 1))
                    .await
                    .unwrap()
            }));
        }
        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap());
        }

        timeout(TEST_TIMEOUT, async {
            for id in &ids {
                h.tracker.monitor().wait(id).await;
            }
        })
        .await
        .unwrap();

        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), OPS as usize);
        assert_eq!(h.remote.submit_count(), OPS as usize);

        let history = h.tracker.get_history(&owner(), None).unwrap();
        assert_eq!(history.len(), OPS as usize);
        assert!(history
            .iter()
            .all(|e| e.status == OperationStatus::Confirmed));
        assert_eq!(h.tracker.pending_count(&owner()).unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_capacity_holds_under_concurrent_appends() {
        let h = harness_with_capacity(5);

        let mut tasks = Vec::new();
        for _ in 0..12 {
            let tracker = h.tracker.clone();
            tasks.push(tokio::spawn(async move {
                tracker
                    .submit_and_track(&owner(), OperationKind::Deposit, deposit(0))
                    .await
                    .unwrap()
            }));
        }
        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap());
        }

        let history = h.tracker.get_history(&owner(), None).unwrap();
        assert_eq!(history.len(), 5);
        assert!(history.iter().all(|e| ids.contains(&e.local_id)));
        assert!(history.iter().all(|e| e.status == OperationStatus::Failed));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_actors_do_not_interfere() {
        let h = harness_with_capacity(10);
        let actors: Vec<ActorId> = (0..4).map(|i| ActorId::new(format!("0xa{}", i))).collect();

        let mut tasks = Vec::new();
        for actor in &actors {
            for _ in 0..3 {
                let tracker = h.tracker.clone();
                let actor = actor.clone();
                tasks.push(tokio::spawn(async move {
                    tracker
                        .submit_and_track(&actor, OperationKind::Deposit, deposit(0))
                        .await
                        .unwrap()
                }));
            }
        }
        for task in tasks {
            task.await.unwrap();
        }

        for actor in &actors {
            let history = h.tracker.get_history(actor, None).unwrap();
            assert_eq!(history.len(), 3, "actor {}", actor);
        }
        h.tracker.clear(&actors[0]).unwrap();
        assert!(h.tracker.get_history(&actors[0], None).unwrap().is_empty());
        assert_eq!(h.tracker.get_history(&actors[1], None).unwrap().len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_every_subscriber_sees_the_verdict() {
        let h = RelayHarness::new();
        h.receipts.script(
            mock_tx_id(1),
            vec![Ok(None), Ok(None), Ok(Some(Receipt::succeeded(9)))],
        );

        let local_id = h
            .tracker
            .submit_and_track(&owner(), OperationKind::Deposit, deposit(3))
            .await
            .unwrap();

        let mut handles = Vec::new();
        let mut sinks = Vec::new();
        for _ in 0..3 {
            let (seen, callback) = collector();
            handles.push(h.tracker.subscribe(&owner(), &local_id, callback));
            sinks.push(seen);
        }
        for handle in handles {
            timeout(TEST_TIMEOUT, handle.finished()).await.unwrap();
        }

        for seen in sinks {
            let events = seen.lock();
            let confirmed = events
                .iter()
                .filter(|e| matches!(e, RelayEvent::Confirmed { .. }))
                .count();
            assert_eq!(confirmed, 1);
        }
    }
}
