//! # Domain Layer
//!
//! Pure history logic, configuration and error types. No I/O.

mod config;
mod errors;
mod history;

pub use config::LedgerConfig;
pub use errors::{KVStoreError, LedgerError};
pub use history::{ActorHistory, UpdateOutcome};
