//! # Receipts
//!
//! What the external ledger reports about a submitted operation.

use serde::{Deserialize, Serialize};

/// Execution outcome reported by a receipt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// Executed without revert.
    Succeeded,
    /// Execution reverted.
    Reverted,
    /// Not reported yet.
    #[default]
    #[serde(other)]
    Unknown,
}

/// Finality stage reported by a receipt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalityStatus {
    /// Included on the ledger (reversible).
    #[serde(rename = "ACCEPTED_ON_L2")]
    AcceptedOnL2,
    /// Settled on the base layer.
    #[serde(rename = "ACCEPTED_ON_L1")]
    AcceptedOnL1,
    /// Rejected by the sequencer.
    #[serde(rename = "REJECTED")]
    Rejected,
    /// Received or pre-confirmed; no verdict yet.
    #[default]
    #[serde(other)]
    Unknown,
}

impl FinalityStatus {
    /// Accepted at either layer.
    pub fn is_accepted(&self) -> bool {
        matches!(self, FinalityStatus::AcceptedOnL2 | FinalityStatus::AcceptedOnL1)
    }
}

/// Receipt lookup result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Execution outcome.
    #[serde(default)]
    pub execution_status: ExecutionStatus,
    /// Finality stage.
    #[serde(default)]
    pub finality_status: FinalityStatus,
    /// Block the operation landed in.
    #[serde(default)]
    pub block_number: Option<u64>,
    /// Actual fee, as reported.
    #[serde(default)]
    pub fee: Option<String>,
    /// Revert reason, when execution reverted.
    #[serde(default)]
    pub revert_reason: Option<String>,
}

/// Verdict derived from a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptOutcome {
    /// No verdict yet; keep polling.
    Pending,
    /// Executed and accepted.
    Succeeded,
    /// Reverted or rejected.
    Failed,
}

impl Receipt {
    /// Derive the verdict. Failure signals win over acceptance: a reverted
    /// operation that was still included on the ledger is a failure.
    pub fn outcome(&self) -> ReceiptOutcome {
        if self.execution_status == ExecutionStatus::Reverted
            || self.finality_status == FinalityStatus::Rejected
        {
            return ReceiptOutcome::Failed;
        }
        if self.execution_status == ExecutionStatus::Succeeded || self.finality_status.is_accepted() {
            return ReceiptOutcome::Succeeded;
        }
        ReceiptOutcome::Pending
    }

    /// Block depth below `head`. Zero while the block is unknown.
    pub fn confirmations(&self, head: u64) -> u64 {
        match self.block_number {
            Some(block) => head.saturating_sub(block),
            None => 0,
        }
    }

    /// Shorthand for a successful receipt at `block`.
    pub fn succeeded(block: u64) -> Self {
        Self {
            execution_status: ExecutionStatus::Succeeded,
            finality_status: FinalityStatus::AcceptedOnL2,
            block_number: Some(block),
            fee: None,
            revert_reason: None,
        }
    }

    /// Shorthand for a reverted receipt at `block`.
    pub fn reverted(block: u64, reason: impl Into<String>) -> Self {
        Self {
            execution_status: ExecutionStatus::Reverted,
            finality_status: FinalityStatus::AcceptedOnL2,
            block_number: Some(block),
            fee: None,
            revert_reason: Some(reason.into()),
        }
    }
}
