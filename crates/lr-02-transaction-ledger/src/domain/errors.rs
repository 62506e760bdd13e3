//! # Domain Errors
//!
//! Error types for the Transaction Ledger.

use shared_types::ActorId;
use thiserror::Error;

/// Key-value store adapter errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError {
        /// Adapter message.
        message: String,
    },

    /// The store reported corruption.
    #[error("KV store corruption: {message}")]
    CorruptionError {
        /// Adapter message.
        message: String,
    },
}

/// Transaction Ledger errors.
///
/// Only infrastructure problems surface here. A missing record or an invalid
/// transition is an `UpdateOutcome`, not an error.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The underlying store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] KVStoreError),

    /// The persisted history could not be decoded.
    #[error("Corrupted history for {actor}: {message}")]
    Corrupted {
        /// Actor whose history is unreadable.
        actor: ActorId,
        /// Decoder message.
        message: String,
    },

    /// The history could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}
