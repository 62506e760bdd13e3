//! # Error Classifier
//!
//! Applies the ordered rule table to raw failure text.

use crate::domain::{ClassificationRule, DEFAULT_RULES, FALLBACK_MESSAGE};
use shared_types::{ClassifiedError, ErrorCategory, FinalityStatus, Receipt};
use std::fmt;
use tracing::{error, trace};

/// Ordered, first-match-wins classifier.
///
/// Total: anything no rule matches becomes `UNKNOWN`, retryable.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    rules: Vec<ClassificationRule>,
}

impl ErrorClassifier {
    /// Create a classifier over a custom rule table.
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    /// The rules, in evaluation order.
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Classify any displayable failure.
    pub fn classify<E: fmt::Display + ?Sized>(&self, error: &E) -> ClassifiedError {
        self.classify_message(&error.to_string())
    }

    /// Classify a raw failure message.
    pub fn classify_message(&self, message: &str) -> ClassifiedError {
        match self.rules.iter().find(|rule| rule.matches(message)) {
            Some(rule) => {
                trace!(category = %rule.category, "[lr-01] Classified failure");
                rule.classify(message)
            }
            None => ClassifiedError::new(ErrorCategory::Unknown, FALLBACK_MESSAGE, message, true),
        }
    }

    /// Build the TRANSACTION error for a receipt that reports failure.
    ///
    /// Built directly rather than by keyword matching: revert reasons are
    /// contract-defined text and would otherwise land in arbitrary buckets.
    pub fn receipt_failure(&self, tx_id: &str, receipt: &Receipt) -> ClassifiedError {
        if receipt.finality_status == FinalityStatus::Rejected {
            return ClassifiedError::new(
                ErrorCategory::Transaction,
                "Transaction rejected by the network.",
                format!("transaction {} rejected", tx_id),
                true,
            )
            .with_code("TRANSACTION_REJECTED");
        }

        let reason = receipt
            .revert_reason
            .as_deref()
            .unwrap_or("execution reverted");
        ClassifiedError::new(
            ErrorCategory::Transaction,
            "Transaction failed on-chain. Please check the details and try again.",
            format!("transaction {} reverted: {}", tx_id, reason),
            true,
        )
        .with_code("TRANSACTION_REVERTED")
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.to_vec())
    }
}

/// Classify with the default rule table.
pub fn classify<E: fmt::Display + ?Sized>(error: &E) -> ClassifiedError {
    ErrorClassifier::default().classify(error)
}

/// Emit a structured log entry for a classified failure.
pub fn log_classified(classified: &ClassifiedError, context: &str) {
    error!(
        category = %classified.category,
        code = ?classified.code,
        retryable = classified.retryable,
        context = context,
        "[lr-01] {}",
        classified.technical_message
    );
}
