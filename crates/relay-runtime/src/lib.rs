//! # Ledger-Relay Runtime
//!
//! Composition root: builds the four subsystems around one transaction
//! ledger and exposes them through [`OperationTracker`].
//!
//! ## Subsystems
//!
//! 1. Error Classifier (lr-01) - failure taxonomy and retry decisions
//! 2. Transaction Ledger (lr-02) - per-actor bounded history
//! 3. Submission Gateway (lr-03) - validate, sign, submit
//! 4. Confirmation Monitor (lr-04) - receipt polling
//!
//! ## Modular Structure
//!
//! - `config` - `RelayConfig` and `RELAY_*` environment overlay
//! - `tracker` - `OperationTracker` facade and history projection
//! - `adapters/` - RocksDB store and JSON-RPC ledger client
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, then environment)
//! 2. Open the ledger store
//! 3. Wire gateway and monitor to the shared ledger and event bus
//! 4. `resume` each actor to re-poll operations left PENDING_CONFIRM

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod tracker;

pub use config::{load_config, load_config_from, ConfigError, RelayConfig};
pub use tracker::{HistoryEntry, OperationTracker, SubscriptionHandle, TrackerError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
