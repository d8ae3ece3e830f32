//! In-process keyed rate limiter using the governor crate.

use std::num::NonZeroU32;

use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter as GovernorRateLimiter};

use blogicum_core::ports::{RateLimitDecision, RateLimiter};

/// Tracked keys above which idle entries are pruned.
const PRUNE_THRESHOLD: usize = 10_000;

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests allowed per key and minute; also the burst size.
    pub per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { per_minute: 20 }
    }
}

impl RateLimitConfig {
    /// Read `AUTH_RATE_LIMIT_PER_MINUTE`.
    pub fn from_env() -> Self {
        Self {
            per_minute: std::env::var("AUTH_RATE_LIMIT_PER_MINUTE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Self::default().per_minute),
        }
    }
}

/// GCRA limiter with one bucket per key. Limits are per process.
pub struct InMemoryRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    clock: DefaultClock,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let per_minute = NonZeroU32::new(config.per_minute).unwrap_or(NonZeroU32::MIN);

        Self {
            limiter: GovernorRateLimiter::keyed(Quota::per_minute(per_minute)),
            clock: DefaultClock::default(),
        }
    }
}

impl RateLimiter for InMemoryRateLimiter {
    fn check(&self, key: &str) -> RateLimitDecision {
        if self.limiter.len() > PRUNE_THRESHOLD {
            self.limiter.retain_recent();
        }

        match self.limiter.check_key(&key.to_string()) {
            Ok(()) => RateLimitDecision::Allowed,
            Err(not_until) => RateLimitDecision::Limited {
                retry_after: not_until.wait_time_from(self.clock.now()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_each_key_separately() {
        let limiter = InMemoryRateLimiter::new(RateLimitConfig { per_minute: 2 });

        assert_eq!(limiter.check("10.0.0.1"), RateLimitDecision::Allowed);
        assert_eq!(limiter.check("10.0.0.1"), RateLimitDecision::Allowed);
        assert!(matches!(
            limiter.check("10.0.0.1"),
            RateLimitDecision::Limited { .. }
        ));

        assert_eq!(limiter.check("10.0.0.2"), RateLimitDecision::Allowed);
    }

    #[test]
    fn test_zero_quota_still_admits_one_request() {
        let limiter = InMemoryRateLimiter::new(RateLimitConfig { per_minute: 0 });

        assert_eq!(limiter.check("a"), RateLimitDecision::Allowed);
        assert!(matches!(limiter.check("a"), RateLimitDecision::Limited { .. }));
    }
}
