//! Liked/disliked titles, persisted in a local key-value store.

mod storage;

pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};

use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::models::Anime;

pub const LIKED_KEY: &str = "likedAnime";
pub const DISLIKED_KEY: &str = "dislikedAnime";

/// How many unrated titles to offer at once.
pub const CANDIDATE_COUNT: usize = 3;

#[derive(Debug, Error)]
pub enum PreferenceError {
    /// Persisted data is not valid JSON of the expected shape.
    #[error("Failed to parse stored preferences for {key}: {source}")]
    StorageParse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Preference storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Preference storage lock poisoned")]
    Poisoned,
}

/// Which list a title was rated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Liked,
    Disliked,
}

impl Rating {
    fn key(&self) -> &'static str {
        match self {
            Rating::Liked => LIKED_KEY,
            Rating::Disliked => DISLIKED_KEY,
        }
    }
}

/// In-memory preference lists mirrored to a [`KeyValueStore`].
pub struct PreferenceStore<S: KeyValueStore> {
    store: S,
    liked: Vec<Anime>,
    disliked: Vec<Anime>,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    /// Load both lists. Unreadable or malformed entries are logged and
    /// start out empty.
    pub fn load(store: S) -> Self {
        let liked = Self::read_list(&store, LIKED_KEY);
        let disliked = Self::read_list(&store, DISLIKED_KEY);
        Self {
            store,
            liked,
            disliked,
        }
    }

    fn read_list(store: &S, key: &str) -> Vec<Anime> {
        let raw = match store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read {} from preference storage: {}", key, e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(source) => {
                let e = PreferenceError::StorageParse {
                    key: key.to_string(),
                    source,
                };
                warn!("{}", e);
                Vec::new()
            }
        }
    }

    fn persist(&self, rating: Rating) -> Result<(), PreferenceError> {
        let list = match rating {
            Rating::Liked => &self.liked,
            Rating::Disliked => &self.disliked,
        };
        let serialized =
            serde_json::to_string(list).map_err(|source| PreferenceError::StorageParse {
                key: rating.key().to_string(),
                source,
            })?;
        self.store.set(rating.key(), &serialized)
    }

    /// Append to a list and write it back.
    pub fn rate(&mut self, anime: Anime, rating: Rating) -> Result<(), PreferenceError> {
        info!("Rated {} ({}) as {:?}", anime.title, anime.mal_id, rating);
        match rating {
            Rating::Liked => self.liked.push(anime),
            Rating::Disliked => self.disliked.push(anime),
        }
        self.persist(rating)
    }

    pub fn like(&mut self, anime: Anime) -> Result<(), PreferenceError> {
        self.rate(anime, Rating::Liked)
    }

    pub fn dislike(&mut self, anime: Anime) -> Result<(), PreferenceError> {
        self.rate(anime, Rating::Disliked)
    }

    pub fn liked(&self) -> &[Anime] {
        &self.liked
    }

    pub fn disliked(&self) -> &[Anime] {
        &self.disliked
    }

    pub fn rating_of(&self, mal_id: u64) -> Option<Rating> {
        if self.liked.iter().any(|a| a.mal_id == mal_id) {
            Some(Rating::Liked)
        } else if self.disliked.iter().any(|a| a.mal_id == mal_id) {
            Some(Rating::Disliked)
        } else {
            None
        }
    }

    pub fn is_rated(&self, mal_id: u64) -> bool {
        self.rating_of(mal_id).is_some()
    }

    /// First few titles from `available` that have not been rated yet.
    pub fn candidates(&self, available: &[Anime]) -> Vec<Anime> {
        available
            .iter()
            .filter(|a| !self.is_rated(a.mal_id))
            .take(CANDIDATE_COUNT)
            .cloned()
            .collect()
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}
