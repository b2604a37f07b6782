//! TV show search through TVMaze.
//!
//! No credentials. The response is a bare array of `{score, show}` pairs with
//! the interesting fields nested under `show`.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{build_http_client, send_json, SourceAdapter, SourceError};
use crate::catalog::{normalize, CollectionItem, MediaType};
use crate::config::SourcesSettings;

const PROVIDER: &str = "TVMaze";
const UNKNOWN_NETWORK: &str = "Unknown Network";

#[derive(Debug, Deserialize)]
struct ShowMatch {
    show: TvMazeShow,
}

#[derive(Debug, Deserialize)]
struct TvMazeShow {
    id: u64,
    name: Option<String>,
    network: Option<Named>,
    image: Option<ShowImage>,
    premiered: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShowImage {
    medium: Option<String>,
}

pub struct TvMazeShowSource {
    client: Client,
    base_url: String,
}

impl TvMazeShowSource {
    pub fn new(settings: &SourcesSettings) -> Result<Self> {
        Ok(Self {
            client: build_http_client(settings.request_timeout_secs)?,
            base_url: settings
                .endpoints
                .tvmaze_base_url
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

fn to_items(matches: Vec<ShowMatch>) -> Vec<CollectionItem> {
    matches
        .into_iter()
        .map(|ShowMatch { show }| {
            let network = show
                .network
                .and_then(|n| n.name)
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNKNOWN_NETWORK.to_string());
            normalize(
                show.id.to_string(),
                MediaType::Tv,
                show.name.as_deref(),
                Some(&network),
                show.image.and_then(|i| i.medium).as_deref(),
                show.premiered.as_deref(),
            )
        })
        .collect()
}

#[async_trait]
impl SourceAdapter for TvMazeShowSource {
    fn media_type(&self) -> MediaType {
        MediaType::Tv
    }

    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, query: &str) -> Result<Vec<CollectionItem>, SourceError> {
        let url = format!("{}/search/shows", self.base_url);
        debug!("Searching {} for {:?}", url, query);
        let request = self.client.get(&url).query(&[("q", query)]);

        // A `null` body is treated the same as no matches
        let matches: Option<Vec<ShowMatch>> = send_json(PROVIDER, request).await?;
        Ok(to_items(matches.unwrap_or_default()))
    }
}
