//! Adaptive navigation throttle.
//!
//! Paces user-triggered navigation (paging, searching, opening a title) so that
//! fast repeated interaction does not turn into a burst of upstream requests.
//! Navigations within a sliding window double the delay, capped at a maximum;
//! a quiet window resets it. The window starts when the throttle is created.

mod config;
mod state;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use tracing::{debug, info};

pub use config::{ceil_secs, ThrottleConfig, DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY, DEFAULT_WINDOW};
pub use state::ThrottleState;

/// Read-only view for progress indicators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleStatus {
    pub is_navigating: bool,
    /// Most recent delay, in whole seconds rounded up.
    pub current_delay_secs: u64,
    pub consecutive: u32,
}

/// Navigation throttle shared by every navigation trigger.
///
/// Clones share state; construct one per application and hand it out.
#[derive(Debug, Clone)]
pub struct NavigationThrottle {
    config: ThrottleConfig,
    state: Arc<Mutex<ThrottleState>>,
    in_flight: Arc<AtomicUsize>,
    status: Arc<watch::Sender<ThrottleStatus>>,
}

/// One delay being waited out. Dropping it, whether the sleep finished or the
/// caller was cancelled, releases the slot.
struct InFlight {
    count: Arc<AtomicUsize>,
    status: Arc<watch::Sender<ThrottleStatus>>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let remaining = self.count.fetch_sub(1, Ordering::AcqRel) - 1;
        if remaining > 0 {
            debug!("{} navigation delays still pending", remaining);
        }
        // Re-checked under the channel lock so a delay that started meanwhile
        // keeps the flag set.
        self.status.send_if_modified(|status| {
            if status.is_navigating && self.count.load(Ordering::Acquire) == 0 {
                status.is_navigating = false;
                true
            } else {
                false
            }
        });
    }
}

impl NavigationThrottle {
    pub fn new() -> Self {
        Self::with_config(ThrottleConfig::default())
    }

    pub fn with_config(config: ThrottleConfig) -> Self {
        let (status, _) = watch::channel(ThrottleStatus {
            is_navigating: false,
            current_delay_secs: ceil_secs(config.base_delay),
            consecutive: 0,
        });

        Self {
            config,
            state: Arc::new(Mutex::new(ThrottleState::new(Instant::now()))),
            in_flight: Arc::new(AtomicUsize::new(0)),
            status: Arc::new(status),
        }
    }

    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    /// Suspend the caller for the adaptive navigation delay.
    ///
    /// Concurrent callers each compute their own delay from the shared state
    /// and each wait it out; nothing is coalesced or cancelled.
    pub async fn start_navigation_delay(&self) -> Duration {
        let (delay, consecutive) = {
            let mut state = self.state.lock().await;
            let delay = state.register(Instant::now(), &self.config);
            (delay, state.consecutive)
        };

        self.status.send_modify(|status| {
            self.in_flight.fetch_add(1, Ordering::AcqRel);
            status.is_navigating = true;
            status.current_delay_secs = ceil_secs(delay);
            status.consecutive = consecutive;
        });
        let _slot = InFlight {
            count: Arc::clone(&self.in_flight),
            status: Arc::clone(&self.status),
        };

        info!(
            "Navigation delay: {:?} (consecutive navigations: {})",
            delay, consecutive
        );

        tokio::time::sleep(delay).await;
        delay
    }

    /// Current status snapshot.
    pub fn status(&self) -> ThrottleStatus {
        self.status.borrow().clone()
    }

    /// Receive status changes, e.g. to drive a countdown.
    pub fn subscribe(&self) -> watch::Receiver<ThrottleStatus> {
        self.status.subscribe()
    }

    /// Copy of the shared counter/timestamp state.
    pub async fn snapshot(&self) -> ThrottleState {
        self.state.lock().await.clone()
    }

    /// Delays currently being waited out.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }
}

impl Default for NavigationThrottle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Let the window that opens at creation expire.
    async fn settle(throttle: &NavigationThrottle) {
        tokio::time::sleep(throttle.config().window).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_triggers_two_seconds_apart() {
        let throttle = NavigationThrottle::new();
        settle(&throttle).await;

        let first = throttle.start_navigation_delay().await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        let second = throttle.start_navigation_delay().await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        let third = throttle.start_navigation_delay().await;

        assert_eq!(first, Duration::from_millis(500));
        assert_eq!(second, Duration::from_millis(1000));
        assert_eq!(third, Duration::from_millis(2000));
        assert_eq!(throttle.snapshot().await.consecutive, 2);
        assert_eq!(throttle.status().current_delay_secs, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_trigger_soon_after_startup_is_consecutive() {
        let throttle = NavigationThrottle::new();
        tokio::time::sleep(Duration::from_secs(2)).await;

        let delay = throttle.start_navigation_delay().await;
        assert_eq!(delay, Duration::from_millis(1000));
        assert_eq!(throttle.snapshot().await.consecutive, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_third_trigger_capped() {
        let throttle = NavigationThrottle::with_config(ThrottleConfig {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(3),
            window: Duration::from_secs(10),
        });
        settle(&throttle).await;

        throttle.start_navigation_delay().await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        throttle.start_navigation_delay().await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        // base * 4 = 4s, above the 3s ceiling
        let third = throttle.start_navigation_delay().await;
        assert_eq!(third, Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_window_resets_counter() {
        let throttle = NavigationThrottle::new();
        settle(&throttle).await;

        throttle.start_navigation_delay().await;
        throttle.start_navigation_delay().await;
        assert_eq!(throttle.snapshot().await.consecutive, 1);

        tokio::time::sleep(Duration::from_secs(11)).await;
        let delay = throttle.start_navigation_delay().await;
        assert_eq!(throttle.snapshot().await.consecutive, 0);
        assert_eq!(delay, Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_burst_stays_at_max() {
        let throttle = NavigationThrottle::new();
        for _ in 0..20 {
            let delay = throttle.start_navigation_delay().await;
            assert!(delay <= DEFAULT_MAX_DELAY);
        }
        assert_eq!(throttle.snapshot().await.consecutive, 20);
        assert_eq!(throttle.status().current_delay_secs, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_triggers_each_wait() {
        let throttle = NavigationThrottle::new();
        settle(&throttle).await;
        let start = Instant::now();

        let a = tokio::spawn({
            let throttle = throttle.clone();
            async move { throttle.start_navigation_delay().await }
        });
        let b = tokio::spawn({
            let throttle = throttle.clone();
            async move { throttle.start_navigation_delay().await }
        });

        let mut delays = vec![a.await.unwrap(), b.await.unwrap()];
        delays.sort();
        assert_eq!(
            delays,
            vec![Duration::from_millis(500), Duration::from_millis(1000)]
        );
        // Overlapping, not serialized
        assert!(start.elapsed() < Duration::from_millis(1500));
        assert!(!throttle.status().is_navigating);
        assert_eq!(throttle.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_reports_navigation() {
        let throttle = NavigationThrottle::new();
        let mut rx = throttle.subscribe();
        assert!(!rx.borrow().is_navigating);
        assert_eq!(rx.borrow().current_delay_secs, 1);

        let handle = tokio::spawn({
            let throttle = throttle.clone();
            async move { throttle.start_navigation_delay().await }
        });

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_navigating);

        handle.await.unwrap();
        assert!(!throttle.status().is_navigating);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_delay_clears_navigating() {
        let throttle = NavigationThrottle::new();

        let cancelled =
            tokio::time::timeout(Duration::from_millis(100), throttle.start_navigation_delay())
                .await;
        assert!(cancelled.is_err());
        assert_eq!(throttle.in_flight(), 0);
        assert!(!throttle.status().is_navigating);

        // A cancelled wait still counted as a navigation
        assert_eq!(throttle.snapshot().await.consecutive, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelling_one_delay_keeps_the_other_navigating() {
        let throttle = NavigationThrottle::new();
        settle(&throttle).await;
        let mut rx = throttle.subscribe();

        let long = tokio::spawn({
            let throttle = throttle.clone();
            async move { throttle.start_navigation_delay().await }
        });
        rx.changed().await.unwrap();

        let cancelled =
            tokio::time::timeout(Duration::from_millis(100), throttle.start_navigation_delay())
                .await;
        assert!(cancelled.is_err());
        assert!(throttle.status().is_navigating);
        assert_eq!(throttle.in_flight(), 1);

        long.await.unwrap();
        assert!(!throttle.status().is_navigating);
        assert_eq!(throttle.in_flight(), 0);
    }
}
