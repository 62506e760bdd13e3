//! # Error Types
//!
//! The closed failure taxonomy attached to FAILED records, and the
//! transition errors raised by the record state machine.

use crate::entities::OperationStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Closed failure taxonomy. `Unknown` makes it exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// Signer or wallet connection problems.
    Wallet,
    /// Contract call or address problems.
    Contract,
    /// Transport-level connectivity failures.
    Network,
    /// The ledger's RPC provider misbehaved.
    Rpc,
    /// Input rejected before or by the ledger; never retryable as-is.
    Validation,
    /// The submitted transaction itself failed.
    Transaction,
    /// Anything the classifier could not place.
    #[serde(other)]
    Unknown,
}

impl ErrorCategory {
    /// Upper-case label used in titles and logs.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorCategory::Wallet => "WALLET",
            ErrorCategory::Contract => "CONTRACT",
            ErrorCategory::Network => "NETWORK",
            ErrorCategory::Rpc => "RPC",
            ErrorCategory::Validation => "VALIDATION",
            ErrorCategory::Transaction => "TRANSACTION",
            ErrorCategory::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A failure mapped onto the taxonomy.
///
/// `user_message` is plain language for display; `technical_message` keeps
/// the raw signal for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedError {
    /// Taxonomy bucket.
    pub category: ErrorCategory,
    /// Plain-language message.
    pub user_message: String,
    /// Raw failure text.
    pub technical_message: String,
    /// Whether re-submitting the same operation may succeed.
    pub retryable: bool,
    /// Machine-readable sub-case, e.g. `PROOF_VERIFICATION_FAILED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ClassifiedError {
    /// Build a classified error without a code.
    pub fn new(
        category: ErrorCategory,
        user_message: impl Into<String>,
        technical_message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            category,
            user_message: user_message.into(),
            technical_message: technical_message.into(),
            retryable,
            code: None,
        }
    }

    /// Attach a machine-readable code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Input rejected locally before the ledger was contacted.
    pub fn validation(user_message: impl Into<String>, technical_message: impl Into<String>) -> Self {
        Self::new(
            ErrorCategory::Validation,
            user_message,
            technical_message,
            false,
        )
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.user_message)
    }
}

/// Violation of the Operation Record invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Status would move backwards or leave a terminal state.
    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidStatus {
        /// Current status.
        from: OperationStatus,
        /// Attempted status.
        to: OperationStatus,
    },

    /// The ledger id was already assigned.
    #[error("Ledger id already set to {existing}")]
    IdAlreadySet {
        /// The id already on the record.
        existing: String,
    },
}
