//! Data models for anidex.

mod anime;
mod catalog;
mod endpoint;

pub use anime::{Aired, Anime, Genre, ImageSet, Images, Recommendation, RecommendationEntry};
pub use catalog::{AnimePage, CatalogPayload, PageItems, Pagination};
pub use endpoint::{Endpoint, EndpointKind};
