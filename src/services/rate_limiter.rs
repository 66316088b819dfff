//! Per-visitor rate limiting for public endpoints
//!
//! GCRA 算法（governor），按客户端 IP 分 key。

use std::num::NonZeroU32;

use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::{debug, trace};

use crate::config::RateLimitConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

pub struct VisitorRateLimiter {
    /// None 表示限流已关闭
    limiter: Option<DefaultKeyedRateLimiter<String>>,
    clock: DefaultClock,
    max_tracked_keys: usize,
}

impl VisitorRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let limiter = if config.enabled {
            let per_minute = NonZeroU32::new(config.per_minute).unwrap_or(NonZeroU32::MIN);
            let burst = NonZeroU32::new(config.burst).unwrap_or(per_minute);
            debug!(
                "Rate limiter: {} req/min, burst {}",
                per_minute, burst
            );
            Some(RateLimiter::keyed(
                Quota::per_minute(per_minute).allow_burst(burst),
            ))
        } else {
            debug!("Rate limiter disabled");
            None
        };

        Self {
            limiter,
            clock: DefaultClock::default(),
            max_tracked_keys: config.max_tracked_keys,
        }
    }

    pub fn disabled() -> Self {
        Self::new(&RateLimitConfig {
            enabled: false,
            ..RateLimitConfig::default()
        })
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        let Some(limiter) = &self.limiter else {
            return RateLimitDecision::Allowed;
        };

        let decision = match limiter.check_key(&key.to_string()) {
            Ok(()) => RateLimitDecision::Allowed,
            Err(not_until) => {
                let wait = not_until.wait_time_from(self.clock.now());
                // 向上取整，至少 1 秒
                let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
                trace!("Rate limited key {} for {}s", key, secs);
                RateLimitDecision::Limited {
                    retry_after_secs: secs.max(1),
                }
            }
        };

        if limiter.len() > self.max_tracked_keys {
            limiter.retain_recent();
            limiter.shrink_to_fit();
            debug!("Rate limiter pruned, {} keys tracked", limiter.len());
        }

        decision
    }

    pub fn tracked_keys(&self) -> usize {
        self.limiter.as_ref().map(|l| l.len()).unwrap_or(0)
    }
}
