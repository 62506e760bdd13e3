//! # Outbound Ports
//!
//! Read-only view of the external ledger.

use crate::domain::QueryError;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{LedgerTxId, Receipt};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

/// External ledger receipt lookup - outbound port.
#[async_trait]
pub trait ReceiptSource: Send + Sync {
    /// Receipt for `tx_id`; `Ok(None)` while the ledger does not know it.
    async fn get_receipt(&self, tx_id: &str) -> Result<Option<Receipt>, QueryError>;

    /// Current head block number.
    async fn current_head(&self) -> Result<u64, QueryError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

type ScriptedReceipt = Result<Option<Receipt>, QueryError>;

/// Mock receipt source.
///
/// Each id has a script of lookup results consumed in order. The last entry
/// repeats forever; an id with no script is never found.
#[derive(Default)]
pub struct MockReceiptSource {
    scripts: Mutex<HashMap<LedgerTxId, VecDeque<ScriptedReceipt>>>,
    polls: Mutex<HashMap<LedgerTxId, u32>>,
    head: AtomicU64,
    head_error: Mutex<Option<QueryError>>,
}

impl MockReceiptSource {
    /// Source that knows nothing, with head 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue lookup results for `tx_id`.
    pub fn script(&self, tx_id: impl Into<LedgerTxId>, results: Vec<ScriptedReceipt>) {
        self.scripts
            .lock()
            .entry(tx_id.into())
            .or_default()
            .extend(results);
    }

    /// Set the head block.
    pub fn set_head(&self, head: u64) {
        self.head.store(head, Ordering::SeqCst);
    }

    /// Make `current_head` fail.
    pub fn fail_head(&self, error: QueryError) {
        *self.head_error.lock() = Some(error);
    }

    /// Lookups made for `tx_id`.
    pub fn polls(&self, tx_id: &str) -> u32 {
        self.polls.lock().get(tx_id).copied().unwrap_or(0)
    }

    /// Lookups made across every id.
    pub fn total_polls(&self) -> u32 {
        self.polls.lock().values().sum()
    }
}

#[async_trait]
impl ReceiptSource for MockReceiptSource {
    async fn get_receipt(&self, tx_id: &str) -> Result<Option<Receipt>, QueryError> {
        *self.polls.lock().entry(tx_id.to_string()).or_insert(0) += 1;

        let mut scripts = self.scripts.lock();
        let Some(queue) = scripts.get_mut(tx_id) else {
            return Ok(None);
        };
        if queue.len() > 1 {
            queue.pop_front().unwrap_or(Ok(None))
        } else {
            queue.front().cloned().unwrap_or(Ok(None))
        }
    }

    async fn current_head(&self) -> Result<u64, QueryError> {
        if let Some(err) = self.head_error.lock().clone() {
            return Err(err);
        }
        Ok(self.head.load(Ordering::SeqCst))
    }
}
