//! Operation payloads and their normalization into ledger calls.
//!
//! ```text
//! OperationPayload ──validate──→ LedgerCall { target, entrypoint, calldata }
//! ```
//!
//! Amounts are encoded as u256 (low, high) felt pairs; everything else is a
//! single felt.

use crate::domain::call::{ContractTargets, LedgerCall};
use crate::domain::errors::PayloadError;
use serde::{Deserialize, Serialize};
use shared_types::OperationKind;

/// 100% in basis points.
pub const TOTAL_BPS: u64 = 10_000;

/// Share of funds routed to one protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolAllocation {
    /// Protocol name, for display.
    pub protocol: String,
    /// Share in basis points.
    pub bps: u32,
}

/// Governance risk constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintParams {
    /// Largest share any single protocol may hold, in bps.
    pub max_single: u32,
    /// Minimum number of protocols funds must be spread over.
    pub min_diversification: u32,
    /// Highest tolerated volatility, in bps.
    pub max_volatility: u32,
    /// Minimum liquidity score.
    pub min_liquidity: u64,
}

/// Risk inputs for one protocol in an orchestration proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolMetrics {
    /// Protocol name, for display.
    pub protocol: String,
    /// Utilization, in bps.
    pub utilization: u32,
    /// Volatility, in bps.
    pub volatility: u32,
    /// Liquidity score.
    pub liquidity: u64,
    /// Audit score (0-100).
    pub audit_score: u32,
    /// Protocol age in days.
    pub age_days: u32,
}

/// A fully constructed operation, one variant per submittable kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationPayload {
    /// Rebalance across protocols.
    AllocationUpdate {
        /// Target shares, summing to 10000 bps.
        allocations: Vec<ProtocolAllocation>,
    },
    /// Replace governance constraints.
    ConstraintSet(ConstraintParams),
    /// Harvest accrued yield.
    YieldAccrual,
    /// Deposit into the strategy.
    Deposit {
        /// Amount in base units.
        #[serde(with = "amount_string")]
        amount: u128,
    },
    /// Withdraw from the strategy.
    Withdraw {
        /// Amount in base units.
        #[serde(with = "amount_string")]
        amount: u128,
    },
    /// Let the risk engine propose and execute an allocation.
    Orchestration {
        /// Per-protocol risk inputs.
        protocols: Vec<ProtocolMetrics>,
    },
}

impl OperationPayload {
    /// Kind this payload describes.
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationPayload::AllocationUpdate { .. } => OperationKind::AllocationUpdate,
            OperationPayload::ConstraintSet(_) => OperationKind::ConstraintSet,
            OperationPayload::YieldAccrual => OperationKind::YieldAccrual,
            OperationPayload::Deposit { .. } => OperationKind::Deposit,
            OperationPayload::Withdraw { .. } => OperationKind::Withdraw,
            OperationPayload::Orchestration { .. } => OperationKind::Orchestration,
        }
    }

    /// Validate against `kind` and build the external call.
    pub fn normalize(
        &self,
        kind: OperationKind,
        targets: &ContractTargets,
    ) -> Result<LedgerCall, PayloadError> {
        if kind == OperationKind::Unknown {
            return Err(PayloadError::UnknownKind);
        }
        if self.kind() != kind {
            return Err(PayloadError::KindMismatch {
                expected: kind,
                actual: self.kind(),
            });
        }

        match self {
            OperationPayload::AllocationUpdate { allocations } => {
                if allocations.is_empty() {
                    return Err(PayloadError::Empty("allocations"));
                }
                for a in allocations {
                    check_bps(&a.protocol, a.bps)?;
                }
                let total: u64 = allocations.iter().map(|a| u64::from(a.bps)).sum();
                if total != TOTAL_BPS {
                    return Err(PayloadError::AllocationTotal { total });
                }
                let calldata = allocations.iter().map(|a| a.bps.to_string()).collect();
                Ok(LedgerCall::new(
                    router(targets)?,
                    "update_allocation",
                    calldata,
                ))
            }
            OperationPayload::ConstraintSet(params) => {
                check_bps("max_single", params.max_single)?;
                check_bps("max_volatility", params.max_volatility)?;
                let target = targets
                    .dao_manager
                    .as_deref()
                    .ok_or(PayloadError::MissingTarget("DAO constraint manager"))?;
                Ok(LedgerCall::new(
                    target,
                    "set_constraints",
                    vec![
                        params.max_single.to_string(),
                        params.min_diversification.to_string(),
                        params.max_volatility.to_string(),
                        params.min_liquidity.to_string(),
                    ],
                ))
            }
            OperationPayload::YieldAccrual => {
                Ok(LedgerCall::new(router(targets)?, "accrue_yields", Vec::new()))
            }
            OperationPayload::Deposit { amount } => {
                Ok(LedgerCall::new(router(targets)?, "deposit", u256(*amount)?))
            }
            OperationPayload::Withdraw { amount } => {
                Ok(LedgerCall::new(router(targets)?, "withdraw", u256(*amount)?))
            }
            OperationPayload::Orchestration { protocols } => {
                if protocols.is_empty() {
                    return Err(PayloadError::Empty("protocols"));
                }
                let mut calldata = Vec::with_capacity(protocols.len() * 5);
                for m in protocols {
                    check_bps(&format!("{} utilization", m.protocol), m.utilization)?;
                    check_bps(&format!("{} volatility", m.protocol), m.volatility)?;
                    calldata.extend([
                        m.utilization.to_string(),
                        m.volatility.to_string(),
                        m.liquidity.to_string(),
                        m.audit_score.to_string(),
                        m.age_days.to_string(),
                    ]);
                }
                let target = targets
                    .risk_engine
                    .as_deref()
                    .ok_or(PayloadError::MissingTarget("risk engine"))?;
                Ok(LedgerCall::new(
                    target,
                    "propose_and_execute_allocation",
                    calldata,
                ))
            }
        }
    }
}

fn router(targets: &ContractTargets) -> Result<&str, PayloadError> {
    targets
        .strategy_router
        .as_deref()
        .ok_or(PayloadError::MissingTarget("strategy router"))
}

fn check_bps(field: &str, value: u32) -> Result<(), PayloadError> {
    if u64::from(value) > TOTAL_BPS {
        return Err(PayloadError::BpsOutOfRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// Encode an amount as a (low, high) u256 pair.
fn u256(amount: u128) -> Result<Vec<String>, PayloadError> {
    if amount == 0 {
        return Err(PayloadError::ZeroAmount);
    }
    Ok(vec![amount.to_string(), "0".to_string()])
}

/// Amounts travel as decimal strings; JSON numbers cannot hold a u128.
mod amount_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
