//! Response envelopes and the validated payload union.

use serde::{Deserialize, Serialize};

use super::anime::{Anime, Recommendation};
use super::endpoint::EndpointKind;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageItems {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub per_page: u32,
}

/// Pagination block of list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub last_visible_page: u32,
    pub has_next_page: bool,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub items: PageItems,
}

/// One page of titles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimePage {
    pub data: Vec<Anime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl AnimePage {
    /// Well-formed page with no items and no pages.
    pub fn empty(per_page: u32) -> Self {
        Self {
            data: Vec::new(),
            pagination: Some(Pagination {
                last_visible_page: 0,
                has_next_page: false,
                current_page: 1,
                items: PageItems {
                    count: 0,
                    total: 0,
                    per_page,
                },
            }),
        }
    }

    /// Number of pages the listing spans (0 when unknown or empty).
    pub fn total_pages(&self) -> u32 {
        self.pagination
            .as_ref()
            .map(|p| p.last_visible_page)
            .unwrap_or(0)
    }

    pub fn has_next_page(&self) -> bool {
        self.pagination.as_ref().is_some_and(|p| p.has_next_page)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct SingleEnvelope {
    data: Anime,
}

#[derive(Debug, Deserialize)]
struct RecommendationsEnvelope {
    data: Vec<Recommendation>,
}

/// A response body validated against the shape its endpoint promises.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogPayload {
    Single(Box<Anime>),
    List(AnimePage),
    Recommendations(Vec<Recommendation>),
}

impl CatalogPayload {
    /// Decode `body` as the shape `kind` describes.
    pub fn decode(kind: EndpointKind, body: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match kind {
            EndpointKind::Single => {
                let envelope: SingleEnvelope = serde_json::from_value(body)?;
                CatalogPayload::Single(Box::new(envelope.data))
            }
            EndpointKind::List => CatalogPayload::List(serde_json::from_value(body)?),
            EndpointKind::Recommendations => {
                let envelope: RecommendationsEnvelope = serde_json::from_value(body)?;
                CatalogPayload::Recommendations(envelope.data)
            }
        })
    }

    pub fn kind(&self) -> EndpointKind {
        match self {
            CatalogPayload::Single(_) => EndpointKind::Single,
            CatalogPayload::List(_) => EndpointKind::List,
            CatalogPayload::Recommendations(_) => EndpointKind::Recommendations,
        }
    }

    pub fn into_single(self) -> Option<Anime> {
        match self {
            CatalogPayload::Single(anime) => Some(*anime),
            _ => None,
        }
    }

    pub fn into_page(self) -> Option<AnimePage> {
        match self {
            CatalogPayload::List(page) => Some(page),
            _ => None,
        }
    }

    pub fn into_recommendations(self) -> Option<Vec<Recommendation>> {
        match self {
            CatalogPayload::Recommendations(recs) => Some(recs),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_page_is_well_formed() {
        let page = AnimePage::empty(10);
        assert!(page.is_empty());
        assert_eq!(page.total_pages(), 0);
        assert!(!page.has_next_page());
        assert_eq!(page.pagination.unwrap().items.total, 0);
    }

    #[test]
    fn test_decode_list() {
        let body = json!({
            "data": [{"mal_id": 20, "title": "Naruto"}],
            "pagination": {
                "last_visible_page": 4,
                "has_next_page": true,
                "current_page": 1,
                "items": {"count": 1, "total": 37, "per_page": 10}
            }
        });
        let page = CatalogPayload::decode(EndpointKind::List, body)
            .unwrap()
            .into_page()
            .unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.total_pages(), 4);
        assert!(page.has_next_page());
    }

    #[test]
    fn test_decode_single() {
        let body = json!({"data": {"mal_id": 5114, "title": "Fullmetal Alchemist: Brotherhood"}});
        let payload = CatalogPayload::decode(EndpointKind::Single, body).unwrap();
        assert_eq!(payload.kind(), EndpointKind::Single);
        assert_eq!(payload.into_single().unwrap().mal_id, 5114);
    }

    #[test]
    fn test_decode_recommendations() {
        let body = json!({"data": [
            {"entry": {"mal_id": 1, "title": "Cowboy Bebop"}, "url": "https://x", "votes": 12}
        ]});
        let recs = CatalogPayload::decode(EndpointKind::Recommendations, body)
            .unwrap()
            .into_recommendations()
            .unwrap();
        assert_eq!(recs[0].entry.title, "Cowboy Bebop");
        assert_eq!(recs[0].votes, 12);
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        // A list body is not a single-item envelope.
        let body = json!({"data": [{"mal_id": 1, "title": "x"}]});
        assert!(CatalogPayload::decode(EndpointKind::Single, body).is_err());
    }
}
