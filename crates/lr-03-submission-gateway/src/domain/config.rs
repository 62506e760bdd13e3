//! Gateway configuration.

use crate::domain::call::ContractTargets;
use crate::domain::policy::AuthorizationPolicy;
use serde::{Deserialize, Serialize};
use shared_types::ActorId;

/// Configuration for the Submission Gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Where each kind is routed.
    pub targets: ContractTargets,
    /// Who may submit what.
    pub policy: AuthorizationPolicy,
}

impl GatewayConfig {
    /// Test addresses, owner `0xowner`, automation identity `0xbot`.
    pub fn for_testing() -> Self {
        Self {
            targets: ContractTargets::for_testing(),
            policy: AuthorizationPolicy::with_owner(ActorId::new("0xowner"))
                .with_automation(ActorId::new("0xbot")),
        }
    }
}
