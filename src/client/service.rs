//! Typed catalog calls on top of [`FetchClient`].

use tracing::{debug, info};

use super::sanitize::sanitize_query;
use super::{FetchClient, FetchError};
use crate::models::{Anime, AnimePage, CatalogPayload, Endpoint, Recommendation};

/// Page size used by list endpoints unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Result of a search, including what was actually sent upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub page: AnimePage,
    /// Term sent upstream, empty when the search was short-circuited.
    pub term: String,
    /// True if significant characters were stripped from the query.
    pub sanitized: bool,
    /// False when sanitization left nothing to search for.
    pub requested: bool,
}

/// Catalog API: search, lookup by id, ranked listing, recommendations.
#[derive(Debug, Clone)]
pub struct CatalogService {
    client: FetchClient,
    base_url: String,
    page_size: u32,
}

impl CatalogService {
    pub fn new(client: FetchClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue `endpoint` and validate the body against its promised shape.
    pub async fn fetch(&self, endpoint: &Endpoint) -> Result<CatalogPayload, FetchError> {
        let url = endpoint.url(&self.base_url);
        let body = self.client.get(&url, &endpoint.query_params()).await?;
        Ok(CatalogPayload::decode(endpoint.kind(), body)?)
    }

    /// Free-text search. Queries that sanitize to nothing return an empty
    /// page without touching the network.
    pub async fn search(&self, query: &str, page: u32) -> Result<SearchOutcome, FetchError> {
        let cleaned = sanitize_query(query);
        if cleaned.sanitized {
            info!("Stripped search syntax from {:?} -> {:?}", query, cleaned.term);
        }

        if cleaned.is_empty() {
            debug!("Query {:?} is empty after sanitizing, skipping request", query);
            return Ok(SearchOutcome {
                page: AnimePage::empty(self.page_size),
                term: String::new(),
                sanitized: cleaned.sanitized,
                requested: false,
            });
        }

        let endpoint = Endpoint::Search {
            query: cleaned.term.clone(),
            page: page.max(1),
            limit: self.page_size,
        };
        let page = self
            .fetch(&endpoint)
            .await?
            .into_page()
            .ok_or(FetchError::UnexpectedPayload { expected: "list" })?;

        Ok(SearchOutcome {
            page,
            term: cleaned.term,
            sanitized: cleaned.sanitized,
            requested: true,
        })
    }

    pub async fn anime_by_id(&self, id: u64) -> Result<Anime, FetchError> {
        self.fetch(&Endpoint::ById { id })
            .await?
            .into_single()
            .ok_or(FetchError::UnexpectedPayload { expected: "single" })
    }

    pub async fn top(&self, page: u32) -> Result<AnimePage, FetchError> {
        let endpoint = Endpoint::Top {
            page: page.max(1),
            limit: self.page_size,
        };
        self.fetch(&endpoint)
            .await?
            .into_page()
            .ok_or(FetchError::UnexpectedPayload { expected: "list" })
    }

    pub async fn recommendations(&self, id: u64) -> Result<Vec<Recommendation>, FetchError> {
        self.fetch(&Endpoint::Recommendations { id })
            .await?
            .into_recommendations()
            .ok_or(FetchError::UnexpectedPayload {
                expected: "recommendations",
            })
    }
}
