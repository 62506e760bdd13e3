//! # Retry With Backoff
//!
//! Re-runs a fallible async operation while its failures classify as
//! retryable, doubling the delay after each attempt.

use crate::classifier::ErrorClassifier;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first failure; doubles each retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Short delays for tests.
    pub fn for_testing() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
        }
    }

    /// Delay before retry number `attempt + 1` (zero-based attempt).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Execute `op`, retrying retryable failures.
///
/// A failure that classifies as non-retryable, or the failure of the last
/// allowed attempt, is returned unchanged. A policy of zero attempts still
/// runs the operation once.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    classifier: &ErrorClassifier,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let classified = classifier.classify(&err);
        if !classified.retryable || attempt + 1 >= max_attempts {
            debug!(
                attempt = attempt + 1,
                category = %classified.category,
                retryable = classified.retryable,
                "[lr-01] Giving up"
            );
            return Err(err);
        }

        let delay = policy.delay_for_attempt(attempt);
        warn!(
            attempt = attempt + 1,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            category = %classified.category,
            "[lr-01] Retrying after failure: {}",
            err
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
