//! Book search through the Google Books volumes API.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{build_http_client, require_credential, send_json, SourceAdapter, SourceError};
use crate::catalog::{normalize, CollectionItem, MediaType};
use crate::config::{SourcesSettings, GOOGLE_BOOKS_API_KEY_VAR};

const PROVIDER: &str = "Google Books";
const UNKNOWN_AUTHOR: &str = "Unknown Author";

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    id: String,
    #[serde(default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    image_links: Option<ImageLinks>,
    published_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageLinks {
    thumbnail: Option<String>,
}

pub struct GoogleBooksSource {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    limit: usize,
}

impl GoogleBooksSource {
    pub fn new(settings: &SourcesSettings) -> Result<Self> {
        Ok(Self {
            client: build_http_client(settings.request_timeout_secs)?,
            api_key: settings.google_books_api_key.clone(),
            base_url: settings
                .endpoints
                .google_books_base_url
                .trim_end_matches('/')
                .to_string(),
            limit: settings.result_limit,
        })
    }
}

fn to_items(response: VolumesResponse) -> Vec<CollectionItem> {
    response
        .items
        .into_iter()
        .map(|volume| {
            let info = volume.volume_info;
            let authors = info
                .authors
                .filter(|authors| !authors.is_empty())
                .map(|authors| authors.join(", "))
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
            // Thumbnails are often plain http
            let thumbnail = info
                .image_links
                .and_then(|links| links.thumbnail)
                .map(|url| url.replacen("http:", "https:", 1));
            normalize(
                volume.id,
                MediaType::Book,
                info.title.as_deref(),
                Some(&authors),
                thumbnail.as_deref(),
                info.published_date.as_deref(),
            )
        })
        .collect()
}

#[async_trait]
impl SourceAdapter for GoogleBooksSource {
    fn media_type(&self) -> MediaType {
        MediaType::Book
    }

    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, query: &str) -> Result<Vec<CollectionItem>, SourceError> {
        let api_key = require_credential(&self.api_key, GOOGLE_BOOKS_API_KEY_VAR)?;

        let url = format!("{}/volumes", self.base_url);
        debug!("Searching {} for {:?}", url, query);
        let limit = self.limit.to_string();
        let request = self.client.get(&url).query(&[
            ("q", query),
            ("key", api_key),
            ("maxResults", limit.as_str()),
        ]);

        let response: VolumesResponse = send_json(PROVIDER, request).await?;
        Ok(to_items(response))
    }
}
