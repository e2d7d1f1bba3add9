//! Navigation throttle configuration.

use std::time::Duration;

/// Delay for an isolated navigation.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);
/// Ceiling for any single navigation delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(3300);
/// Navigations closer together than this count as one burst.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleConfig {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub window: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            window: DEFAULT_WINDOW,
        }
    }
}

impl ThrottleConfig {
    /// `min(base_delay * 2^consecutive, max_delay)`.
    pub fn delay_for(&self, consecutive: u32) -> Duration {
        let factor = 2u32.checked_pow(consecutive).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Whole seconds, rounded up, for countdown display.
pub fn ceil_secs(delay: Duration) -> u64 {
    let secs = delay.as_secs();
    if delay.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_doubles_until_cap() {
        let config = ThrottleConfig::default();
        assert_eq!(config.delay_for(0), Duration::from_millis(500));
        assert_eq!(config.delay_for(1), Duration::from_millis(1000));
        assert_eq!(config.delay_for(2), Duration::from_millis(2000));
        assert_eq!(config.delay_for(3), Duration::from_millis(3300));
    }

    #[test]
    fn test_delay_never_exceeds_max() {
        let config = ThrottleConfig::default();
        for c in 0..200 {
            let delay = config.delay_for(c);
            assert!(delay <= config.max_delay);
            assert_eq!(
                delay,
                Duration::from_millis(500)
                    .saturating_mul(2u32.checked_pow(c).unwrap_or(u32::MAX))
                    .min(config.max_delay)
            );
        }
    }

    #[test]
    fn test_ceil_secs() {
        assert_eq!(ceil_secs(Duration::ZERO), 0);
        assert_eq!(ceil_secs(Duration::from_millis(500)), 1);
        assert_eq!(ceil_secs(Duration::from_millis(2000)), 2);
        assert_eq!(ceil_secs(Duration::from_millis(3300)), 4);
    }
}
