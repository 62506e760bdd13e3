//! Presentation projection of a classified error.

use serde::{Deserialize, Serialize};
use shared_types::ClassifiedError;

/// What a presentation layer shows for a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDisplay {
    /// `"<CATEGORY> Error"`.
    pub title: String,
    /// The plain-language message.
    pub message: String,
    /// True when the user can usefully try again.
    pub actionable: bool,
}

impl From<&ClassifiedError> for ErrorDisplay {
    fn from(error: &ClassifiedError) -> Self {
        Self {
            title: format!("{} Error", error.category),
            message: error.user_message.clone(),
            actionable: error.retryable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ErrorCategory;

    #[test]
    fn test_display_projection() {
        let err = ClassifiedError::new(ErrorCategory::Rpc, "RPC down", "rpc 503", true);
        let display = ErrorDisplay::from(&err);
        assert_eq!(display.title, "RPC Error");
        assert_eq!(display.message, "RPC down");
        assert!(display.actionable);
    }

    #[test]
    fn test_validation_is_not_actionable() {
        let err = ClassifiedError::validation("Invalid input.", "invalid bps");
        assert!(!ErrorDisplay::from(&err).actionable);
    }
}
