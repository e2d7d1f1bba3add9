//! Request descriptors for the catalog API.

/// Which response shape an endpoint produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// `{"data": Anime}`
    Single,
    /// `{"data": [Anime], "pagination": {...}}`
    List,
    /// `{"data": [Recommendation]}`
    Recommendations,
}

impl EndpointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointKind::Single => "single",
            EndpointKind::List => "list",
            EndpointKind::Recommendations => "recommendations",
        }
    }
}

/// A single catalog call, built fresh per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Free-text search.
    Search { query: String, page: u32, limit: u32 },
    /// Fetch one title by MAL id.
    ById { id: u64 },
    /// Ranked listing.
    Top { page: u32, limit: u32 },
    /// Recommendations for a title.
    Recommendations { id: u64 },
}

impl Endpoint {
    pub fn kind(&self) -> EndpointKind {
        match self {
            Endpoint::Search { .. } | Endpoint::Top { .. } => EndpointKind::List,
            Endpoint::ById { .. } => EndpointKind::Single,
            Endpoint::Recommendations { .. } => EndpointKind::Recommendations,
        }
    }

    /// Path relative to the API base URL.
    pub fn path(&self) -> String {
        match self {
            Endpoint::Search { .. } => "/anime".to_string(),
            Endpoint::ById { id } => format!("/anime/{}", id),
            Endpoint::Top { .. } => "/top/anime".to_string(),
            Endpoint::Recommendations { id } => format!("/anime/{}/recommendations", id),
        }
    }

    /// Query parameters, in the order they are sent.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::Search { query, page, limit } => vec![
                ("q", query.clone()),
                ("page", page.to_string()),
                ("limit", limit.to_string()),
            ],
            Endpoint::Top { page, limit } => {
                vec![("page", page.to_string()), ("limit", limit.to_string())]
            }
            Endpoint::ById { .. } | Endpoint::Recommendations { .. } => Vec::new(),
        }
    }

    /// Full URL under `base_url`, tolerating a trailing slash on the base.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_endpoint() {
        let endpoint = Endpoint::Search {
            query: "naruto".to_string(),
            page: 2,
            limit: 10,
        };
        assert_eq!(endpoint.kind(), EndpointKind::List);
        assert_eq!(
            endpoint.url("https://api.jikan.moe/v4/"),
            "https://api.jikan.moe/v4/anime"
        );
        assert_eq!(
            endpoint.query_params(),
            vec![
                ("q", "naruto".to_string()),
                ("page", "2".to_string()),
                ("limit", "10".to_string())
            ]
        );
    }

    #[test]
    fn test_id_endpoints_have_no_params() {
        let by_id = Endpoint::ById { id: 5114 };
        assert_eq!(by_id.path(), "/anime/5114");
        assert!(by_id.query_params().is_empty());

        let recs = Endpoint::Recommendations { id: 5114 };
        assert_eq!(recs.path(), "/anime/5114/recommendations");
        assert_eq!(recs.kind(), EndpointKind::Recommendations);
    }
}
