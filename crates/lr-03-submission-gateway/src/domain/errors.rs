//! # Domain Errors
//!
//! Error types for the Submission Gateway.
//!
//! Collaborator errors render with keywords the classifier recognizes, so a
//! signer refusal lands in WALLET and a transport failure in NETWORK.

use lr_02_transaction_ledger::LedgerError;
use shared_types::{ClassifiedError, OperationKind, TransitionError};
use thiserror::Error;

/// Internal failures of `submit`. Expected failures (policy, validation,
/// signer, ledger) are recorded as FAILED instead.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The transaction ledger failed.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The payload could not be encoded as record details.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The record refused the gateway's own transition.
    #[error("Record transition refused: {0}")]
    Transition(#[from] TransitionError),
}

/// Rejected before the ledger is contacted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// The payload describes a different kind than the one requested.
    #[error("invalid payload: expected {expected:?}, got {actual:?}")]
    KindMismatch {
        /// Requested kind.
        expected: OperationKind,
        /// Kind the payload describes.
        actual: OperationKind,
    },

    /// UNKNOWN is read-only.
    #[error("invalid operation kind: UNKNOWN cannot be submitted")]
    UnknownKind,

    /// The routing table has no address for this operation.
    #[error("invalid configuration: no {0} address configured")]
    MissingTarget(&'static str),

    /// Allocations must sum to exactly 10000 basis points.
    #[error("invalid allocation: total {total} bps, expected 10000")]
    AllocationTotal {
        /// Actual total.
        total: u64,
    },

    /// A single value exceeded 10000 basis points.
    #[error("invalid {field}: {value} bps exceeds 10000")]
    BpsOutOfRange {
        /// Offending field.
        field: String,
        /// Offending value.
        value: u32,
    },

    /// A list that must not be empty was empty.
    #[error("invalid payload: {0} must not be empty")]
    Empty(&'static str),

    /// Amounts must be positive.
    #[error("invalid amount: must be greater than zero")]
    ZeroAmount,
}

impl PayloadError {
    /// Plain-language message for the record.
    pub fn user_message(&self) -> &'static str {
        match self {
            PayloadError::MissingTarget(_) => {
                "Contract address missing. Please check the relay configuration."
            }
            PayloadError::AllocationTotal { .. } | PayloadError::BpsOutOfRange { .. } => {
                "Allocations must add up to 100%."
            }
            PayloadError::ZeroAmount => "Amount must be greater than zero.",
            _ => "Invalid input. Please check your values and try again.",
        }
    }
}

impl From<&PayloadError> for ClassifiedError {
    fn from(err: &PayloadError) -> Self {
        ClassifiedError::validation(err.user_message(), err.to_string())
    }
}

/// The actor is not permitted to submit this kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unauthorized: {actor} may not submit {kind:?} ({reason})")]
pub struct PolicyViolation {
    /// Submitting actor.
    pub actor: String,
    /// Requested kind.
    pub kind: OperationKind,
    /// Which rule refused it.
    pub reason: &'static str,
}

impl From<&PolicyViolation> for ClassifiedError {
    fn from(err: &PolicyViolation) -> Self {
        ClassifiedError::validation(
            "You are not authorized to perform this operation.",
            err.to_string(),
        )
        .with_code("UNAUTHORIZED")
    }
}

/// Signing collaborator failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizeError {
    /// The signer declined.
    #[error("signer rejected request: {0}")]
    Rejected(String),

    /// No signer available.
    #[error("wallet unavailable: {0}")]
    Unavailable(String),
}

/// External submit failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
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

    /// The ledger refused the transaction.
    #[error("transaction rejected: {0}")]
    Rejected(String),
}
