//! Browse session: the user-facing flow over the store and throttle.
//!
//! Query changes, page changes and title opens wait out the navigation
//! throttle before their store action runs. Initial loads do not.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::client::has_significant_chars;
use crate::store::{AnimeStore, AppState};
use crate::throttle::NavigationThrottle;

#[derive(Debug, Default)]
struct SearchTracking {
    previous_term: String,
    sanitized: bool,
    search_operation: bool,
}

/// Clears the page-change flag when the change ends or is cancelled.
struct PageChangeGuard<'a>(&'a AtomicBool);

impl Drop for PageChangeGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Why a page change did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageChange {
    Changed,
    /// Already on that page.
    Unchanged,
    /// Another page change or a load is still running.
    Busy,
}

/// One user's browsing flow. Clones share state.
#[derive(Debug, Clone)]
pub struct BrowseSession {
    store: AnimeStore,
    throttle: NavigationThrottle,
    tracking: Arc<Mutex<SearchTracking>>,
    page_change_in_progress: Arc<AtomicBool>,
}

impl BrowseSession {
    pub fn new(store: AnimeStore, throttle: NavigationThrottle) -> Self {
        Self {
            store,
            throttle,
            tracking: Arc::new(Mutex::new(SearchTracking::default())),
            page_change_in_progress: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn store(&self) -> &AnimeStore {
        &self.store
    }

    pub fn throttle(&self) -> &NavigationThrottle {
        &self.throttle
    }

    pub async fn state(&self) -> AppState {
        self.store.snapshot().await
    }

    /// Whether the active query had search syntax stripped.
    pub async fn special_chars_sanitized(&self) -> bool {
        self.tracking.lock().await.sanitized
    }

    /// Whether results come from a search rather than the top listing.
    pub async fn is_search_operation(&self) -> bool {
        self.tracking.lock().await.search_operation
    }

    /// Apply a (debounced) query. An empty query shows the top listing.
    pub async fn submit_query(&self, term: &str) {
        let previous = self.tracking.lock().await.previous_term.clone();
        if !previous.is_empty() && term != previous {
            self.throttle.start_navigation_delay().await;
        }

        self.run_query(term).await;
        self.tracking.lock().await.previous_term = term.to_string();
    }

    /// Re-run the active query for the current page without throttling.
    pub async fn refresh(&self) {
        let term = self.store.snapshot().await.search_query;
        self.run_query(&term).await;
    }

    async fn run_query(&self, term: &str) {
        let page = self.store.snapshot().await.current_page;

        if !term.is_empty() {
            {
                let mut tracking = self.tracking.lock().await;
                tracking.sanitized = has_significant_chars(term);
                tracking.search_operation = true;
            }
            self.store.set_search_query(term).await;
            self.store.search_anime(term, page).await;
        } else {
            debug!("Empty search, showing top anime");
            {
                let mut tracking = self.tracking.lock().await;
                tracking.sanitized = false;
                tracking.search_operation = false;
            }
            self.store.set_search_query("").await;
            self.store.get_top_anime(page).await;
        }
    }

    /// Move to `page`, throttled. Ignored while another change or a load runs.
    pub async fn change_page(&self, page: u32) -> PageChange {
        let state = self.store.snapshot().await;
        if state.is_loading || self.page_change_in_progress.load(Ordering::Acquire) {
            return PageChange::Busy;
        }
        if page == state.current_page {
            return PageChange::Unchanged;
        }
        if self
            .page_change_in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return PageChange::Busy;
        }
        let _guard = PageChangeGuard(&self.page_change_in_progress);

        self.throttle.start_navigation_delay().await;
        self.store.set_current_page(page).await;
        self.refresh().await;

        PageChange::Changed
    }

    /// Open a title's detail view, throttled.
    pub async fn open_details(&self, id: u64) {
        self.throttle.start_navigation_delay().await;
        self.store.get_anime_details(id).await;
    }

    /// Load recommendations for a title. Not a navigation, so not throttled.
    pub async fn load_recommendations(&self, id: u64) {
        self.store.get_recommendations(id).await;
    }
}
