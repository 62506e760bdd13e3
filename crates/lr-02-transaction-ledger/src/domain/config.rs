//! Ledger configuration.

use serde::{Deserialize, Serialize};

/// Default number of records kept per actor.
pub const DEFAULT_CAPACITY: usize = 50;

/// Configuration for the Transaction Ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Records kept per actor; older records are evicted (default: 50).
    pub capacity: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl LedgerConfig {
    /// Small capacity so eviction is easy to exercise.
    pub fn for_testing() -> Self {
        Self { capacity: 5 }
    }

    /// Set the per-actor capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Capacity actually enforced. A history always keeps its newest record.
    pub fn effective_capacity(&self) -> usize {
        self.capacity.max(1)
    }
}
