//! # LR-02 Transaction Ledger
//!
//! Bounded, persistent, per-actor history of Operation Records.
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Every submitted operation is recorded here before the external ledger is
//! contacted, and every later status change is written back here. Each
//! actor owns one history:
//! - newest-first, bounded to `capacity` entries (oldest evicted)
//! - persisted as one JSON array under `tx_history:<actor>`
//! - mutated only through `OperationRecord::apply`, so status stays monotonic
//!
//! ## Concurrency
//!
//! Every read-modify-write for an actor runs under that actor's mutex, so two
//! monitors finishing different operations of the same actor cannot lose
//! each other's updates. Different actors never contend.
//!
//! ## Module Structure
//!
//! ```text
//! lr-02-transaction-ledger/
//! ├── domain/      # ActorHistory, UpdateOutcome, LedgerConfig, errors
//! ├── ports/       # OperationLedger (inbound), KeyValueStore, TimeSource (outbound)
//! ├── adapters/    # InMemoryKVStore
//! └── service.rs   # TransactionLedger
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::InMemoryKVStore;
pub use domain::{ActorHistory, KVStoreError, LedgerConfig, LedgerError, UpdateOutcome};
pub use ports::{FixedTimeSource, KeyValueStore, OperationLedger, SystemTimeSource, TimeSource};
pub use service::TransactionLedger;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
