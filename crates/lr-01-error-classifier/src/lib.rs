//! # LR-01 Error Classifier
//!
//! Maps raw failure signals onto the closed failure taxonomy and decides
//! whether an operation is worth retrying.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Data-driven rule table, no I/O
//!
//! ## Purpose
//!
//! Every failure in the relay (signer refusals, RPC transport errors,
//! contract reverts, local validation) is consulted against an ordered,
//! first-match-wins table of keyword rules:
//! - the category decides how the failure is presented
//! - the retryable flag decides whether `retry_with_backoff` tries again
//! - the optional code names well-known sub-cases
//!
//! ## Module Structure
//!
//! ```text
//! lr-01-error-classifier/
//! ├── domain/        # ClassificationRule, DEFAULT_RULES, ErrorDisplay
//! ├── classifier.rs  # ErrorClassifier, classify, log_classified
//! └── retry.rs       # RetryPolicy, retry_with_backoff
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classifier;
pub mod domain;
pub mod retry;

// Re-exports
pub use classifier::{classify, log_classified, ErrorClassifier};
pub use domain::{ClassificationRule, ErrorDisplay, DEFAULT_RULES};
pub use retry::{retry_with_backoff, RetryPolicy};

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
