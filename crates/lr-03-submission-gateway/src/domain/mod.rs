//! # Domain Layer
//!
//! Payloads, calls, policy and errors. No I/O.

pub mod call;
pub mod config;
pub mod errors;
pub mod payload;
pub mod policy;

pub use call::{ContractTargets, LedgerCall, SignedSubmission};
pub use config::GatewayConfig;
pub use errors::{AuthorizeError, GatewayError, PayloadError, PolicyViolation, SubmitError};
pub use payload::{
    ConstraintParams, OperationPayload, ProtocolAllocation, ProtocolMetrics, TOTAL_BPS,
};
pub use policy::AuthorizationPolicy;
