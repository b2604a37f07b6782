//! Entertainment Passport
//!
//! Searches public catalogues for movies, TV shows, games, albums and books,
//! and keeps the chosen ones in a local SQLite collection that can be
//! watched, exported and imported.

pub mod catalog;
pub mod collection;
pub mod config;
pub mod library;
pub mod sources;
pub mod sqlite_persistence;

pub use catalog::{CollectionItem, MediaType, SortOrder, Year};
pub use collection::{CollectionStore, ImportReport, LiveQuery, SqliteCollectionStore};
pub use library::{AddOutcome, Library};
pub use sources::{SearchDispatcher, SourceError};
