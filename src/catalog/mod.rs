//! Canonical item schema and the normalizer every search adapter goes through.

pub mod models;
pub mod normalize;

pub use models::{
    iso_timestamp, CollectionItem, MediaType, SortOrder, Year, DATA_UNAVAILABLE,
    PLACEHOLDER_COVER_URL,
};
pub use normalize::normalize;
