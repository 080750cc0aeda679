//! Timing and retry configuration for the extraction session.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded retry limit for the staggered editor render.
///
/// The editor is checked up to `max_retries + 1` times, `delay` apart,
/// before the code field falls back to its sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Delay between editor checks.
    pub delay: Duration,

    /// Retries after the first check. Default: 10.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            max_retries: 10,
        }
    }
}

impl RetryPolicy {
    pub fn new(delay: Duration, max_retries: u32) -> Self {
        Self { delay, max_retries }
    }

    /// Total number of checks including the first one.
    pub fn attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

/// Configuration for a [`Session`](crate::pipeline::Session).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScribeConfig {
    /// Editor retry limit for code extraction.
    pub code_retry: RetryPolicy,

    /// Delay after a client-side navigation before the watcher is re-armed,
    /// letting the new page begin rendering. Default: 1s.
    pub navigation_settle: Duration,

    /// Upper bound on the explanation call. Default: 60s.
    pub explain_timeout: Duration,

    /// Whether to request an explanation at all.
    ///
    /// Default: true.
    pub explain: bool,
}

impl Default for ScribeConfig {
    fn default() -> Self {
        Self {
            code_retry: RetryPolicy::default(),
            navigation_settle: Duration::from_millis(1000),
            explain_timeout: Duration::from_secs(60),
            explain: true,
        }
    }
}

impl ScribeConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the editor retry limit.
    pub fn with_code_retry(mut self, policy: RetryPolicy) -> Self {
        self.code_retry = policy;
        self
    }

    /// Set the post-navigation settle delay.
    pub fn with_navigation_settle(mut self, settle: Duration) -> Self {
        self.navigation_settle = settle;
        self
    }

    /// Set the explanation timeout.
    pub fn with_explain_timeout(mut self, timeout: Duration) -> Self {
        self.explain_timeout = timeout;
        self
    }

    /// Enable or disable the explanation step.
    pub fn with_explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }
}
