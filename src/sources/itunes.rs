//! Album search through the iTunes Search API.
//!
//! Requests go through a pass-through proxy (allorigins by default) that
//! would otherwise serve stale cached responses, so every request carries a
//! strictly increasing `timestamp` parameter.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::debug;

use super::{build_http_client, send_json, SourceAdapter, SourceError};
use crate::catalog::{normalize, CollectionItem, MediaType};
use crate::config::SourcesSettings;

const PROVIDER: &str = "iTunes";

#[derive(Debug, Deserialize)]
struct AlbumSearchResponse {
    #[serde(default)]
    results: Vec<ItunesAlbum>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItunesAlbum {
    collection_id: u64,
    collection_name: Option<String>,
    artist_name: Option<String>,
    artwork_url100: Option<String>,
    release_date: Option<String>,
}

pub struct ItunesAlbumSource {
    client: Client,
    search_url: String,
    proxy_url: String,
    limit: usize,
    last_cache_buster: AtomicI64,
}

impl ItunesAlbumSource {
    pub fn new(settings: &SourcesSettings) -> Result<Self> {
        Ok(Self {
            client: build_http_client(settings.request_timeout_secs)?,
            search_url: settings.endpoints.itunes_search_url.clone(),
            proxy_url: settings.endpoints.cors_proxy_url.clone(),
            limit: settings.result_limit,
            last_cache_buster: AtomicI64::new(0),
        })
    }

    /// Current time in milliseconds, bumped when needed so two calls in the
    /// same millisecond still differ.
    fn next_cache_buster(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last_cache_buster
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        now.max(previous + 1)
    }

    fn target_url(&self, query: &str) -> String {
        format!(
            "{}?term={}&media=music&entity=album&limit={}",
            self.search_url,
            urlencoding::encode(query),
            self.limit
        )
    }
}

fn to_items(response: AlbumSearchResponse) -> Vec<CollectionItem> {
    response
        .results
        .into_iter()
        .map(|album| {
            let artwork = album
                .artwork_url100
                .map(|url| url.replace("100x100", "600x600"));
            normalize(
                album.collection_id.to_string(),
                MediaType::Album,
                album.collection_name.as_deref(),
                album.artist_name.as_deref(),
                artwork.as_deref(),
                album.release_date.as_deref(),
            )
        })
        .collect()
}

#[async_trait]
impl SourceAdapter for ItunesAlbumSource {
    fn media_type(&self) -> MediaType {
        MediaType::Album
    }

    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, query: &str) -> Result<Vec<CollectionItem>, SourceError> {
        let target = self.target_url(query);
        let cache_buster = self.next_cache_buster().to_string();
        debug!("Searching {} via proxy {}", target, self.proxy_url);

        let request = self
            .client
            .get(&self.proxy_url)
            .query(&[("url", target.as_str()), ("timestamp", cache_buster.as_str())]);

        let response: AlbumSearchResponse = send_json(PROVIDER, request).await?;
        Ok(to_items(response))
    }
}
