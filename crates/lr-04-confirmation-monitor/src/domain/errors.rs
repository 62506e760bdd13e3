//! # Domain Errors
//!
//! Error types for the Confirmation Monitor.

use lr_02_transaction_ledger::LedgerError;
use shared_types::{LocalId, OperationStatus};
use thiserror::Error;

/// Receipt lookup failures. Rendered with classifier keywords.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Transport-level failure.
    #[error("network error: {0}")]
    Transport(String),

    /// The RPC provider returned an error object.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Provider message.
        message: String,
    },

    /// The response could not be decoded.
    #[error("RPC response malformed: {0}")]
    Malformed(String),
}

/// Reasons `start` refuses to poll.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// No record with this local id.
    #[error("Unknown operation: {0}")]
    UnknownOperation(LocalId),

    /// The record was never accepted by the ledger.
    #[error("Operation {0} has no ledger id")]
    MissingLedgerId(LocalId),

    /// Nothing left to observe.
    #[error("Operation {local_id} is already {status:?}")]
    AlreadyTerminal {
        /// Operation.
        local_id: LocalId,
        /// Its terminal status.
        status: OperationStatus,
    },

    /// The transaction ledger failed.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
