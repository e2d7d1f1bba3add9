//! Retry policy and per-request retry bookkeeping.

use std::time::Duration;

/// Wait before the first attempt of every request.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);
/// Backoff unit; the n-th retry waits `base_delay * 2^n`.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1500);
/// Attempts allowed against HTTP 429 before giving up.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Timing and retry limits for the fetch client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub settle_delay: Duration,
    pub base_delay: Duration,
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            base_delay: DEFAULT_BASE_DELAY,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `retry_count`.
    pub fn backoff_delay(&self, retry_count: u32) -> Duration {
        let factor = 2u32.checked_pow(retry_count).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Retry state owned by one in-flight request.
#[derive(Debug, Clone)]
pub struct RetryState {
    retry_count: u32,
    max_retries: u32,
    last_delay: Option<Duration>,
}

impl RetryState {
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            retry_count: 0,
            max_retries: policy.max_retries,
            last_delay: None,
        }
    }

    /// Record a 429. Returns the backoff to wait before the next attempt,
    /// or `None` once the retry budget is spent.
    pub fn record_rate_limit(&mut self, policy: &RetryPolicy) -> Option<Duration> {
        if self.retry_count < self.max_retries {
            self.retry_count += 1;
        }
        if self.retry_count < self.max_retries {
            let delay = policy.backoff_delay(self.retry_count);
            self.last_delay = Some(delay);
            Some(delay)
        } else {
            self.last_delay = None;
            None
        }
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn last_delay(&self) -> Option<Duration> {
        self.last_delay
    }

    pub fn is_exhausted(&self) -> bool {
        self.retry_count >= self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            settle_delay: Duration::ZERO,
            base_delay: Duration::from_millis(100),
            max_retries: 3,
        }
    }

    #[test]
    fn test_backoff_is_exponential_in_retry_count() {
        let policy = policy();
        for r in 0..policy.max_retries {
            assert_eq!(
                policy.backoff_delay(r),
                Duration::from_millis(100 * 2u64.pow(r))
            );
        }
    }

    #[test]
    fn test_backoff_saturates() {
        let policy = policy();
        assert_eq!(policy.backoff_delay(64), Duration::from_millis(100) * u32::MAX);
    }

    #[test]
    fn test_retry_budget() {
        let policy = policy();
        let mut state = RetryState::new(&policy);

        assert_eq!(
            state.record_rate_limit(&policy),
            Some(Duration::from_millis(200))
        );
        assert_eq!(
            state.record_rate_limit(&policy),
            Some(Duration::from_millis(400))
        );
        assert_eq!(state.record_rate_limit(&policy), None);
        assert!(state.is_exhausted());
        assert_eq!(state.retry_count(), 3);

        // Never counts past the maximum.
        assert_eq!(state.record_rate_limit(&policy), None);
        assert_eq!(state.retry_count(), 3);
    }

    #[test]
    fn test_zero_retries_fails_first_429() {
        let policy = RetryPolicy {
            max_retries: 0,
            ..policy()
        };
        let mut state = RetryState::new(&policy);
        assert!(state.is_exhausted());
        assert_eq!(state.record_rate_limit(&policy), None);
        assert_eq!(state.retry_count(), 0);
    }
}
