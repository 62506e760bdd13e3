//! # Shared Types Crate
//!
//! Domain types shared by every Ledger-Relay subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the persisted `OperationRecord` schema lives here
//!   and nowhere else.
//! - **Additive Schema Evolution**: every optional field deserializes with a
//!   default, and unknown operation kinds collapse to `OperationKind::Unknown`.
//! - **Monotonic Status**: transitions are enforced by `OperationRecord::apply`,
//!   not by callers.

pub mod entities;
pub mod errors;
pub mod ids;
pub mod receipt;

pub use entities::*;
pub use errors::*;
pub use ids::*;
pub use receipt::*;

/// Current wall-clock time in unix milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
