//! External submission shapes.

use serde::{Deserialize, Serialize};
use shared_types::ActorId;

/// One contract invocation, as the external ledger expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerCall {
    /// Contract address.
    pub target: String,
    /// Entrypoint name.
    pub entrypoint: String,
    /// Felt-encoded arguments, decimal strings.
    pub calldata: Vec<String>,
}

impl LedgerCall {
    /// Build a call.
    pub fn new(target: impl Into<String>, entrypoint: &str, calldata: Vec<String>) -> Self {
        Self {
            target: target.into(),
            entrypoint: entrypoint.to_string(),
            calldata,
        }
    }
}

/// A call authorized by the signing collaborator. Opaque to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedSubmission {
    /// Account the call is sent from.
    pub sender: ActorId,
    /// The authorized call.
    pub call: LedgerCall,
    /// Signature material produced by the signer.
    pub signature: Vec<String>,
    /// Account nonce the signature covers.
    pub nonce: String,
    /// Fee ceiling the signature covers.
    pub max_fee: String,
}

/// Addresses of the contracts operations are routed to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTargets {
    /// Receives allocation updates, yield accrual, deposits and withdrawals.
    pub strategy_router: Option<String>,
    /// Receives constraint updates.
    pub dao_manager: Option<String>,
    /// Receives orchestration proposals.
    pub risk_engine: Option<String>,
}

impl ContractTargets {
    /// Placeholder addresses for tests.
    pub fn for_testing() -> Self {
        Self {
            strategy_router: Some("0x0a11".into()),
            dao_manager: Some("0x0da0".into()),
            risk_engine: Some("0x0e15".into()),
        }
    }
}
