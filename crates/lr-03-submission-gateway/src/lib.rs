//! # LR-03 Submission Gateway
//!
//! Turns a caller's operation into a ledger submission, recording every
//! attempt before the external ledger is contacted.
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Guarantees
//!
//! | Guarantee | How |
//! |-----------|-----|
//! | Nothing silently lost | The record is appended before any check runs |
//! | No double reporting | Exactly one append, at most one update per call |
//! | No hidden retries | Failures are classified and recorded, never retried |
//! | Unauthorized calls stay local | Policy is checked before the signer is asked |
//!
//! ## Module Structure
//!
//! ```text
//! lr-03-submission-gateway/
//! ├── domain/      # OperationPayload, LedgerCall, AuthorizationPolicy, errors
//! ├── ports/       # SubmissionApi (inbound), Authorizer, LedgerSubmitter (outbound)
//! └── service.rs   # SubmissionGateway
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use domain::{
    AuthorizationPolicy, AuthorizeError, ConstraintParams, ContractTargets, GatewayConfig,
    GatewayError, LedgerCall, OperationPayload, PayloadError, PolicyViolation, ProtocolAllocation,
    ProtocolMetrics, SignedSubmission, SubmitError, TOTAL_BPS,
};
pub use ports::{Authorizer, LedgerSubmitter, MockAuthorizer, MockLedger, SubmissionApi};
pub use service::SubmissionGateway;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    #[allow(clippy::const_is_empty)]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
