//! Routes a search to the adapter registered for its category.

use anyhow::Result;
use std::collections::HashMap;
use tracing::{debug, error};

use super::google_books::GoogleBooksSource;
use super::igdb::IgdbGameSource;
use super::itunes::ItunesAlbumSource;
use super::tmdb::TmdbMovieSource;
use super::tvmaze::TvMazeShowSource;
use super::{SourceAdapter, SourceError};
use crate::catalog::{CollectionItem, MediaType};
use crate::config::SourcesSettings;

pub struct SearchDispatcher {
    adapters: HashMap<MediaType, Box<dyn SourceAdapter>>,
}

impl SearchDispatcher {
    /// Builds one adapter per category from the given settings.
    ///
    /// Missing credentials are not an error here: the affected adapter
    /// reports them when it is first asked to search.
    pub fn from_settings(settings: &SourcesSettings) -> Result<Self> {
        let adapters: Vec<Box<dyn SourceAdapter>> = vec![
            Box::new(TmdbMovieSource::new(settings)?),
            Box::new(TvMazeShowSource::new(settings)?),
            Box::new(IgdbGameSource::new(settings)?),
            Box::new(ItunesAlbumSource::new(settings)?),
            Box::new(GoogleBooksSource::new(settings)?),
        ];
        Ok(Self::with_adapters(adapters))
    }

    /// Registers adapters by the category they serve. A later adapter for the
    /// same category replaces an earlier one.
    pub fn with_adapters(adapters: Vec<Box<dyn SourceAdapter>>) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|adapter| (adapter.media_type(), adapter))
            .collect();
        Self { adapters }
    }

    /// Searches the provider for `media_type`.
    ///
    /// A blank query returns no results without touching the network.
    /// Adapter failures are logged and returned unchanged.
    pub async fn search(
        &self,
        query: &str,
        media_type: MediaType,
    ) -> Result<Vec<CollectionItem>, SourceError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let Some(adapter) = self.adapters.get(&media_type) else {
            return Err(SourceError::NoProvider(media_type));
        };

        debug!(
            "Dispatching {} search {:?} to {}",
            media_type,
            query,
            adapter.provider()
        );
        match adapter.fetch(query).await {
            Ok(items) => {
                debug!("{} returned {} results", adapter.provider(), items.len());
                Ok(items)
            }
            Err(err) => {
                error!("Search API Error ({}): {}", adapter.provider(), err);
                Err(err)
            }
        }
    }
}
