//! Monitor configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Confirmation Monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Delay between polls (default: 3s).
    pub poll_interval: Duration,
    /// Polls before giving up (default: 40, two minutes at the default interval).
    pub max_attempts: u32,
    /// Finished sessions kept for `state`/`session` lookups, oldest dropped
    /// first (default: 256).
    pub retained_sessions: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            max_attempts: 40,
            retained_sessions: 256,
        }
    }
}

impl MonitorConfig {
    /// Short interval and few attempts for tests.
    pub fn for_testing() -> Self {
        Self {
            poll_interval: Duration::from_millis(10),
            max_attempts: 5,
            retained_sessions: 16,
        }
    }

    /// Longest a session can poll before timing out.
    pub fn max_wait(&self) -> Duration {
        self.poll_interval
            .saturating_mul(self.max_attempts.saturating_sub(1))
    }
}
