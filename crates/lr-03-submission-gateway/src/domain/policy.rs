//! Static authorization policy.
//!
//! | Kind | Who may submit |
//! |------|----------------|
//! | ALLOCATION_UPDATE, ORCHESTRATION | owner or an automation identity |
//! | CONSTRAINT_SET | owner |
//! | DEPOSIT, WITHDRAW, YIELD_ACCRUAL | anyone |
//! | UNKNOWN | nobody |

use crate::domain::errors::PolicyViolation;
use serde::{Deserialize, Serialize};
use shared_types::{ActorId, OperationKind};

/// Who may submit privileged kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationPolicy {
    /// Contract owner. With no owner configured, owner-only kinds are refused.
    pub owner: Option<ActorId>,
    /// Automation identities allowed to rebalance.
    pub automation: Vec<ActorId>,
}

impl AuthorizationPolicy {
    /// Policy with an owner and no automation identities.
    pub fn with_owner(owner: ActorId) -> Self {
        Self {
            owner: Some(owner),
            automation: Vec::new(),
        }
    }

    /// Add an automation identity.
    pub fn with_automation(mut self, identity: ActorId) -> Self {
        self.automation.push(identity);
        self
    }

    fn is_owner(&self, actor: &ActorId) -> bool {
        self.owner.as_ref() == Some(actor)
    }

    fn is_automation(&self, actor: &ActorId) -> bool {
        self.automation.contains(actor)
    }

    /// Check whether `actor` may submit `kind`.
    pub fn check(&self, actor: &ActorId, kind: OperationKind) -> Result<(), PolicyViolation> {
        let reason = match kind {
            OperationKind::Deposit | OperationKind::Withdraw | OperationKind::YieldAccrual => {
                return Ok(())
            }
            OperationKind::AllocationUpdate | OperationKind::Orchestration => {
                if self.is_owner(actor) || self.is_automation(actor) {
                    return Ok(());
                }
                "owner or automation only"
            }
            OperationKind::ConstraintSet => {
                if self.is_owner(actor) {
                    return Ok(());
                }
                "owner only"
            }
            OperationKind::Unknown => "unknown kind",
        };

        Err(PolicyViolation {
            actor: actor.to_string(),
            kind,
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> AuthorizationPolicy {
        AuthorizationPolicy::with_owner(ActorId::new("0xowner"))
            .with_automation(ActorId::new("0xbot"))
    }

    #[test]
    fn test_open_kinds() {
        let stranger = ActorId::new("0xstranger");
        for kind in [
            OperationKind::Deposit,
            OperationKind::Withdraw,
            OperationKind::YieldAccrual,
        ] {
            assert!(policy().check(&stranger, kind).is_ok());
        }
    }

    #[test]
    fn test_allocation_owner_or_automation() {
        let p = policy();
        assert!(p.check(&ActorId::new("0xOWNER"), OperationKind::AllocationUpdate).is_ok());
        assert!(p.check(&ActorId::new("0xbot"), OperationKind::Orchestration).is_ok());
        assert!(p
            .check(&ActorId::new("0xstranger"), OperationKind::AllocationUpdate)
            .is_err());
    }

    #[test]
    fn test_constraints_owner_only() {
        let p = policy();
        assert!(p.check(&ActorId::new("0xowner"), OperationKind::ConstraintSet).is_ok());
        let err = p
            .check(&ActorId::new("0xbot"), OperationKind::ConstraintSet)
            .unwrap_err();
        assert_eq!(err.reason, "owner only");
    }

    #[test]
    fn test_no_owner_refuses_privileged_kinds() {
        let p = AuthorizationPolicy::default();
        assert!(p.check(&ActorId::new("0x1"), OperationKind::ConstraintSet).is_err());
        assert!(p.check(&ActorId::new("0x1"), OperationKind::Deposit).is_ok());
    }

    #[test]
    fn test_unknown_refused() {
        assert!(policy()
            .check(&ActorId::new("0xowner"), OperationKind::Unknown)
            .is_err());
    }
}
