//! Shared navigation burst state.

use std::time::Duration;

use tokio::time::Instant;

use super::config::ThrottleConfig;

/// Counter/timestamp pair shared by every navigation trigger.
#[derive(Debug, Clone)]
pub struct ThrottleState {
    /// Consecutive navigations within the burst window.
    pub consecutive: u32,
    /// When the previous navigation was registered, or when the throttle was
    /// created if nothing has navigated yet.
    pub last_navigation: Instant,
    /// Delay computed for the most recent navigation.
    pub current_delay: Duration,
}

impl ThrottleState {
    pub fn new(created: Instant) -> Self {
        Self {
            consecutive: 0,
            last_navigation: created,
            current_delay: Duration::ZERO,
        }
    }

    /// Register a navigation at `now` and return the delay it must wait.
    pub fn register(&mut self, now: Instant, config: &ThrottleConfig) -> Duration {
        if now.saturating_duration_since(self.last_navigation) < config.window {
            self.consecutive = self.consecutive.saturating_add(1);
        } else {
            self.consecutive = 0;
        }

        self.last_navigation = now;
        self.current_delay = config.delay_for(self.consecutive);
        self.current_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_navigation_soon_after_creation_counts_as_burst() {
        let config = ThrottleConfig::default();
        let created = Instant::now();
        let mut state = ThrottleState::new(created);

        let delay = state.register(created + Duration::from_secs(2), &config);
        assert_eq!(state.consecutive, 1);
        assert_eq!(delay, config.base_delay * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_after_quiet_start_uses_base_delay() {
        let config = ThrottleConfig::default();
        let created = Instant::now();
        let mut state = ThrottleState::new(created);

        let delay = state.register(created + config.window, &config);
        assert_eq!(state.consecutive, 0);
        assert_eq!(delay, config.base_delay);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_then_reset() {
        let config = ThrottleConfig::default();
        let created = Instant::now();
        let mut state = ThrottleState::new(created);
        let start = created + Duration::from_secs(60);

        state.register(start, &config);
        state.register(start + Duration::from_secs(1), &config);
        state.register(start + Duration::from_secs(2), &config);
        assert_eq!(state.consecutive, 2);

        // Exactly at the window boundary is no longer a burst
        let delay = state.register(start + Duration::from_secs(12), &config);
        assert_eq!(state.consecutive, 0);
        assert_eq!(delay, config.base_delay);
    }
}
