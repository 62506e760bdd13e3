//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the Transaction Ledger.

use crate::domain::KVStoreError;

/// Abstract interface for key-value database operations.
///
/// Production: `RocksDbStore` (relay-runtime/src/adapters/rocksdb_adapter.rs)
/// Testing: `InMemoryKVStore` (adapters/memory.rs)
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Delete a key.
    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError>;
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Current time in unix milliseconds.
    fn now_millis(&self) -> u64;
}

/// Default time source using system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_millis(&self) -> u64 {
        shared_types::now_millis()
    }
}

/// Time source that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource(pub u64);

impl TimeSource for FixedTimeSource {
    fn now_millis(&self) -> u64 {
        self.0
    }
}
