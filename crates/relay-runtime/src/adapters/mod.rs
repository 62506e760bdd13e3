//! # Production Adapters
//!
//! Port implementations backed by real infrastructure. Each is behind a
//! feature so library users can wire their own:
//!
//! ```toml
//! relay-runtime = { path = "...", default-features = false, features = ["rocksdb"] }
//! ```
//!
//! | Feature | Adapter | Port |
//! |---------|---------|------|
//! | `rocksdb` | `RocksDbStore` | `KeyValueStore` |
//! | `rpc` | `JsonRpcLedgerClient` | `LedgerSubmitter`, `ReceiptSource` |

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

#[cfg(feature = "rpc")]
pub mod rpc_client;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbConfig, RocksDbStore, CF_HISTORY};

#[cfg(feature = "rpc")]
pub use rpc_client::{JsonRpcLedgerClient, TXN_HASH_NOT_FOUND};

// Re-export in-memory adapters for testing
pub use lr_02_transaction_ledger::InMemoryKVStore;
pub use lr_03_submission_gateway::{MockAuthorizer, MockLedger};
pub use lr_04_confirmation_monitor::MockReceiptSource;
