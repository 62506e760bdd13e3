//! # Integration Harness
//!
//! Wires a full `OperationTracker` over mock ledger endpoints so scenarios
//! can script submissions and receipts, then inspect the shared ledger.

use std::sync::Arc;

use parking_lot::Mutex;

use lr_02_transaction_ledger::{InMemoryKVStore, KeyValueStore, OperationLedger, TransactionLedger};
use lr_03_submission_gateway::{MockAuthorizer, MockLedger, OperationPayload, ProtocolAllocation};
use lr_04_confirmation_monitor::MockReceiptSource;
use relay_runtime::{OperationTracker, RelayConfig};
use shared_bus::RelayEvent;
use shared_types::ActorId;

/// Owner identity configured by `GatewayConfig::for_testing`.
pub const OWNER: &str = "0xowner";

/// Automation identity configured by `GatewayConfig::for_testing`.
pub const BOT: &str = "0xbot";

/// A tracker plus handles on every mock behind it.
pub struct RelayHarness {
    /// The facade under test.
    pub tracker: Arc<OperationTracker>,
    /// The ledger the tracker writes to.
    pub ledger: Arc<dyn OperationLedger>,
    /// Submit endpoint.
    pub remote: Arc<MockLedger>,
    /// Receipt endpoint.
    pub receipts: Arc<MockReceiptSource>,
}

impl RelayHarness {
    /// In-memory store with test timings.
    pub fn new() -> Self {
        Self::with_config(RelayConfig::for_testing())
    }

    /// In-memory store with the given configuration.
    pub fn with_config(config: RelayConfig) -> Self {
        Self::with_store(InMemoryKVStore::new(), config)
    }

    /// Any store, e.g. a RocksDB directory.
    pub fn with_store<S: KeyValueStore + 'static>(store: S, config: RelayConfig) -> Self {
        Self::with_endpoints(
            store,
            config,
            Arc::new(MockLedger::new()),
            Arc::new(MockReceiptSource::new()),
        )
    }

    /// Any store with existing mock endpoints, so a restarted harness sees
    /// the same ledger state as the one it replaces.
    pub fn with_endpoints<S: KeyValueStore + 'static>(
        store: S,
        config: RelayConfig,
        remote: Arc<MockLedger>,
        receipts: Arc<MockReceiptSource>,
    ) -> Self {
        let ledger: Arc<dyn OperationLedger> =
            Arc::new(TransactionLedger::new(store, config.ledger.clone()));
        let tracker = Arc::new(OperationTracker::new(
            ledger.clone(),
            Arc::new(MockAuthorizer::approving()),
            remote.clone(),
            receipts.clone(),
            config,
        ));
        Self {
            tracker,
            ledger,
            remote,
            receipts,
        }
    }
}

impl Default for RelayHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// The configured owner.
pub fn owner() -> ActorId {
    ActorId::new(OWNER)
}

/// The configured automation identity.
pub fn bot() -> ActorId {
    ActorId::new(BOT)
}

/// An identity with no privileges.
pub fn stranger() -> ActorId {
    ActorId::new("0x5742")
}

/// Deposit of `amount` base units.
pub fn deposit(amount: u128) -> OperationPayload {
    OperationPayload::Deposit { amount }
}

/// A valid two-protocol split.
pub fn balanced_allocation() -> OperationPayload {
    OperationPayload::AllocationUpdate {
        allocations: vec![
            ProtocolAllocation {
                protocol: "nostra".into(),
                bps: 6_000,
            },
            ProtocolAllocation {
                protocol: "zklend".into(),
                bps: 4_000,
            },
        ],
    }
}

/// Id `MockLedger` hands out for its `n`th unscripted submission.
pub fn mock_tx_id(n: u64) -> String {
    format!("0x{:064x}", n)
}

/// Callback that records every event it receives.
pub fn collector() -> (
    Arc<Mutex<Vec<RelayEvent>>>,
    impl Fn(RelayEvent) + Send + Sync + 'static,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |event| sink.lock().push(event))
}
