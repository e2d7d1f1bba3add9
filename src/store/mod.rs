//! Application state and the actions that fill it.
//!
//! Actions call the catalog service and translate results into state fields.
//! Failures never escape an action: they land in [`AppState::error`] and the
//! state stays usable for the next attempt.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::client::{CatalogService, FetchError};
use crate::models::{Anime, AnimePage, Recommendation};

/// State consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub search_results: Option<AnimePage>,
    pub anime_details: Option<Anime>,
    pub recommendations: Vec<Recommendation>,
    pub is_loading: bool,
    pub is_loading_recommendations: bool,
    pub error: Option<String>,
    pub search_query: String,
    pub current_page: u32,
    /// Whether the last search had syntax stripped from it.
    pub last_search_sanitized: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            search_results: None,
            anime_details: None,
            recommendations: Vec::new(),
            is_loading: false,
            is_loading_recommendations: false,
            error: None,
            search_query: String::new(),
            current_page: 1,
            last_search_sanitized: false,
        }
    }
}

/// Shared state store. Clones share state.
#[derive(Debug, Clone)]
pub struct AnimeStore {
    service: CatalogService,
    state: Arc<RwLock<AppState>>,
}

impl AnimeStore {
    pub fn new(service: CatalogService) -> Self {
        Self {
            service,
            state: Arc::new(RwLock::new(AppState::default())),
        }
    }

    pub fn service(&self) -> &CatalogService {
        &self.service
    }

    pub async fn snapshot(&self) -> AppState {
        self.state.read().await.clone()
    }

    /// Search the catalog. A blank query clears the results instead.
    pub async fn search_anime(&self, query: &str, page: u32) {
        if query.trim().is_empty() {
            self.state.write().await.search_results = None;
            return;
        }

        self.begin_loading().await;
        let result = self.service.search(query, page).await;

        let mut state = self.state.write().await;
        state.is_loading = false;
        match result {
            Ok(outcome) => {
                debug!(
                    "Search {:?} returned {} items",
                    outcome.term,
                    outcome.page.data.len()
                );
                state.last_search_sanitized = outcome.sanitized;
                state.search_results = Some(outcome.page);
            }
            Err(e) => Self::record_error(&mut state, &e),
        }
    }

    pub async fn get_anime_details(&self, id: u64) {
        {
            let mut state = self.state.write().await;
            state.is_loading = true;
            state.error = None;
            state.anime_details = None;
        }
        let result = self.service.anime_by_id(id).await;

        let mut state = self.state.write().await;
        state.is_loading = false;
        match result {
            Ok(anime) => state.anime_details = Some(anime),
            Err(e) => Self::record_error(&mut state, &e),
        }
    }

    pub async fn get_top_anime(&self, page: u32) {
        self.begin_loading().await;
        let result = self.service.top(page).await;

        let mut state = self.state.write().await;
        state.is_loading = false;
        match result {
            Ok(page) => {
                state.last_search_sanitized = false;
                state.search_results = Some(page);
            }
            Err(e) => Self::record_error(&mut state, &e),
        }
    }

    pub async fn get_recommendations(&self, id: u64) {
        {
            let mut state = self.state.write().await;
            state.is_loading_recommendations = true;
            state.error = None;
        }
        let result = self.service.recommendations(id).await;

        let mut state = self.state.write().await;
        state.is_loading_recommendations = false;
        match result {
            Ok(recs) => state.recommendations = recs,
            Err(e) => Self::record_error(&mut state, &e),
        }
    }

    pub async fn set_search_query(&self, query: &str) {
        self.state.write().await.search_query = query.to_string();
    }

    pub async fn set_current_page(&self, page: u32) {
        self.state.write().await.current_page = page.max(1);
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    async fn begin_loading(&self) {
        let mut state = self.state.write().await;
        state.is_loading = true;
        state.error = None;
    }

    fn record_error(state: &mut AppState, error: &FetchError) {
        warn!("Catalog request failed: {}", error);
        state.error = Some(error.user_message());
    }
}
