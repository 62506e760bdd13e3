//! Classification rules.
//!
//! Rules are evaluated in order and the first match wins, so narrower rules
//! (a contract that was not found) must precede broader ones (any contract
//! failure). Matching is case-sensitive substring search on the raw message.

use shared_types::{ClassifiedError, ErrorCategory};

/// One row of the classification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationRule {
    /// Category assigned on match.
    pub category: ErrorCategory,
    /// Machine-readable sub-case.
    pub code: Option<&'static str>,
    /// The message must contain at least one of these.
    pub any_of: &'static [&'static str],
    /// If non-empty, the message must also contain at least one of these.
    pub and_any_of: &'static [&'static str],
    /// Plain-language message shown to the user.
    pub user_message: &'static str,
    /// Whether re-submitting may succeed.
    pub retryable: bool,
}

impl ClassificationRule {
    /// Check if the raw message matches this rule.
    pub fn matches(&self, message: &str) -> bool {
        let primary = self.any_of.iter().any(|k| message.contains(k));
        let secondary =
            self.and_any_of.is_empty() || self.and_any_of.iter().any(|k| message.contains(k));
        primary && secondary
    }

    /// Build the classified error for a matching message.
    pub fn classify(&self, message: &str) -> ClassifiedError {
        let error = ClassifiedError::new(self.category, self.user_message, message, self.retryable);
        match self.code {
            Some(code) => error.with_code(code),
            None => error,
        }
    }
}

const CONTRACT_KEYWORDS: &[&str] = &["contract", "Contract", "entrypoint"];
const TRANSACTION_KEYWORDS: &[&str] = &["transaction", "tx"];

/// The default ordered rule table.
pub const DEFAULT_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        category: ErrorCategory::Wallet,
        code: None,
        any_of: &["wallet", "signer"],
        and_any_of: &[],
        user_message: "Wallet connection issue. Please reconnect your wallet.",
        retryable: true,
    },
    ClassificationRule {
        category: ErrorCategory::Network,
        code: None,
        any_of: &["network", "Connection refused", "ECONNREFUSED"],
        and_any_of: &[],
        user_message: "Network connection error. Check your internet and try again.",
        retryable: true,
    },
    ClassificationRule {
        category: ErrorCategory::Rpc,
        code: None,
        any_of: &["RPC", "rpc"],
        and_any_of: &[],
        user_message: "RPC provider error. The network may be temporarily unavailable.",
        retryable: true,
    },
    ClassificationRule {
        category: ErrorCategory::Contract,
        code: Some("CONTRACT_NOT_FOUND"),
        any_of: CONTRACT_KEYWORDS,
        and_any_of: &["not found"],
        user_message: "Contract not found. Contract address may be incorrect.",
        retryable: false,
    },
    ClassificationRule {
        category: ErrorCategory::Contract,
        code: Some("CONTRACT_CALL_FAILED"),
        any_of: CONTRACT_KEYWORDS,
        and_any_of: &[],
        user_message: "Contract interaction failed. Please check contract configuration.",
        retryable: true,
    },
    ClassificationRule {
        category: ErrorCategory::Validation,
        code: Some("PROOF_VERIFICATION_FAILED"),
        any_of: &[
            "Proof not verified",
            "proof verification failed",
            "Strict Mode",
            "FactRegistry",
        ],
        and_any_of: &[],
        user_message: "Proof verification failed. The proof could not be verified on-chain.",
        retryable: false,
    },
    ClassificationRule {
        category: ErrorCategory::Validation,
        code: None,
        any_of: &["invalid", "Invalid"],
        and_any_of: &[],
        user_message: "Invalid input. Please check your values and try again.",
        retryable: false,
    },
    ClassificationRule {
        category: ErrorCategory::Validation,
        code: Some("INSUFFICIENT_BALANCE"),
        any_of: &["balance", "insufficient", "Insufficient"],
        and_any_of: &[],
        user_message: "Insufficient balance. Please check your account balance.",
        retryable: false,
    },
    ClassificationRule {
        category: ErrorCategory::Transaction,
        code: Some("TRANSACTION_REJECTED"),
        any_of: TRANSACTION_KEYWORDS,
        and_any_of: &["rejected", "Rejected"],
        user_message: "Transaction rejected. Please try again.",
        retryable: true,
    },
    ClassificationRule {
        category: ErrorCategory::Transaction,
        code: Some("TRANSACTION_TIMEOUT"),
        any_of: TRANSACTION_KEYWORDS,
        and_any_of: &["timeout"],
        user_message: "Transaction timeout. The network may be congested.",
        retryable: true,
    },
    ClassificationRule {
        category: ErrorCategory::Transaction,
        code: None,
        any_of: TRANSACTION_KEYWORDS,
        and_any_of: &[],
        user_message: "Transaction failed. Please check the details and try again.",
        retryable: true,
    },
];

/// User message when no rule matches.
pub(crate) const FALLBACK_MESSAGE: &str = "An unexpected error occurred. Please try again later.";
