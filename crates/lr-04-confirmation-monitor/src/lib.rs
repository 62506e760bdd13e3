//! # LR-04 Confirmation Monitor
//!
//! Watches accepted operations until the external ledger reaches a verdict,
//! then records it in the transaction ledger.
//!
//! **Subsystem ID:** 4
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Guarantees
//!
//! | Guarantee | How |
//! |-----------|-----|
//! | One loop per operation | `start` is idempotent while a session is polling |
//! | Bounded polling | `max_attempts` polls at `poll_interval`, then TIMED_OUT |
//! | Lookup errors never fail an operation | They are logged and polling continues |
//! | Timeouts never lose an operation | The record stays PENDING_CONFIRM and can be resumed |
//! | Stopped means stopped | Results arriving after `stop` are discarded |
//! | Verdict before state | A session reports SUCCEEDED/FAILED only after the ledger holds it |
//! | Bounded memory | Exited sessions move to a cache of `retained_sessions` entries |
//!
//! ## Module Structure
//!
//! ```text
//! lr-04-confirmation-monitor/
//! ├── domain/      # PollSession, MonitorState, MonitorConfig, errors
//! ├── ports/       # MonitorApi (inbound), ReceiptSource (outbound)
//! └── service.rs   # ConfirmationMonitor
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use domain::{
    MonitorConfig, MonitorError, MonitorState, PollObservation, PollSession, QueryError, Step,
};
pub use ports::{MockReceiptSource, MonitorApi, ReceiptSource};
pub use service::ConfirmationMonitor;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
