// Retry policies for the two probe paths
//
// Format probing backs off exponentially (1s, 2s, 4s, ...).
// Playlist expansion waits a fixed base plus random jitter between rate-limited attempts.

use rand::Rng;
use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// `base * 2^attempt`, no jitter, no cap
    Exponential { base: Duration },
    /// `base + uniform[0, jitter)`
    FixedWithJitter { base: Duration, jitter: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Policy for format probing
    pub fn exponential() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Backoff::Exponential {
                base: Duration::from_secs(1),
            },
        }
    }

    /// Policy for playlist/channel expansion under rate limiting
    pub fn rate_limited() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Backoff::FixedWithJitter {
                base: Duration::from_secs(10),
                jitter: Duration::from_secs(5),
            },
        }
    }

    /// Same attempt count, no waiting
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Exponential {
                base: Duration::ZERO,
            },
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Delay to wait after failed attempt number `attempt` (0-indexed)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Exponential { base } => base.saturating_mul(2u32.saturating_pow(attempt)),
            Backoff::FixedWithJitter { base, jitter } => {
                if jitter.is_zero() {
                    return base;
                }
                let extra = rand::thread_rng().gen_range(0.0..jitter.as_secs_f64());
                base + Duration::from_secs_f64(extra)
            }
        }
    }

    /// Whether another attempt follows failed attempt `attempt`
    pub fn has_next(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::exponential()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_delays() {
        let policy = RetryPolicy::exponential();
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(5), Duration::from_secs(32));
    }

    #[test]
    fn test_jitter_bounds() {
        let policy = RetryPolicy::rate_limited();
        for attempt in 0..50 {
            let delay = policy.delay_for(attempt);
            assert!(delay >= Duration::from_secs(10));
            assert!(delay < Duration::from_secs(15));
        }
    }

    #[test]
    fn test_attempt_accounting() {
        let policy = RetryPolicy::immediate(3);
        assert!(policy.has_next(0));
        assert!(policy.has_next(1));
        assert!(!policy.has_next(2));
        assert_eq!(policy.delay_for(2), Duration::ZERO);
    }
}
