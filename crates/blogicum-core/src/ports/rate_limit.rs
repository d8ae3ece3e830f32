//! Rate limiting port.

use std::time::Duration;

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after: Duration },
}

/// Per-key request throttle.
pub trait RateLimiter: Send + Sync {
    /// Count one request for `key` and decide whether it may proceed.
    fn check(&self, key: &str) -> RateLimitDecision;
}
