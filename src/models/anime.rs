//! Catalog entries as returned by the upstream API.

use serde::{Deserialize, Serialize};

/// Image URLs in a single format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSet {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub small_image_url: Option<String>,
    #[serde(default)]
    pub large_image_url: Option<String>,
}

/// Cover images, in both formats the catalog serves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Images {
    #[serde(default)]
    pub jpg: ImageSet,
    #[serde(default)]
    pub webp: ImageSet,
}

/// Airing window. Either end may be missing for unfinished or unannounced shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aired {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub mal_id: u64,
    pub name: String,
}

/// A single anime title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anime {
    /// MyAnimeList identifier, stable across requests.
    pub mal_id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_english: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_japanese: Option<String>,
    #[serde(default)]
    pub images: Images,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scored_by: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aired: Option<Aired>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<Genre>,
}

impl Anime {
    /// English title when the catalog has one, otherwise the romanized title.
    pub fn display_title(&self) -> &str {
        self.title_english
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.title)
    }

    /// Comma-separated genre names.
    pub fn genre_names(&self) -> String {
        self.genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The title a recommendation points at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationEntry {
    pub mal_id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_japanese: Option<String>,
    #[serde(default)]
    pub images: Images,
}

/// A user recommendation linking one title to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub entry: RecommendationEntry,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub votes: u32,
}
