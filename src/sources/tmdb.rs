//! Movie search through The Movie Database (TMDB).
//!
//! The API key travels in the query string; results come wrapped in a
//! `results` array.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{build_http_client, require_credential, send_json, SourceAdapter, SourceError};
use crate::catalog::{normalize, CollectionItem, MediaType};
use crate::config::{SourcesSettings, TMDB_API_KEY_VAR};

const PROVIDER: &str = "TMDB";

#[derive(Debug, Deserialize)]
struct MovieSearchResponse {
    #[serde(default)]
    results: Vec<TmdbMovie>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovie {
    id: u64,
    title: Option<String>,
    poster_path: Option<String>,
    release_date: Option<String>,
}

pub struct TmdbMovieSource {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    image_base_url: String,
}

impl TmdbMovieSource {
    pub fn new(settings: &SourcesSettings) -> Result<Self> {
        Ok(Self {
            client: build_http_client(settings.request_timeout_secs)?,
            api_key: settings.tmdb_api_key.clone(),
            base_url: settings
                .endpoints
                .tmdb_base_url
                .trim_end_matches('/')
                .to_string(),
            image_base_url: settings
                .endpoints
                .tmdb_image_base_url
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn to_items(&self, response: MovieSearchResponse) -> Vec<CollectionItem> {
        response
            .results
            .into_iter()
            .map(|movie| {
                let poster = movie
                    .poster_path
                    .filter(|path| !path.is_empty())
                    .map(|path| format!("{}{}", self.image_base_url, path));
                // TMDB search results carry no director or studio
                normalize(
                    movie.id.to_string(),
                    MediaType::Movie,
                    movie.title.as_deref(),
                    None,
                    poster.as_deref(),
                    movie.release_date.as_deref(),
                )
            })
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for TmdbMovieSource {
    fn media_type(&self) -> MediaType {
        MediaType::Movie
    }

    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, query: &str) -> Result<Vec<CollectionItem>, SourceError> {
        let api_key = require_credential(&self.api_key, TMDB_API_KEY_VAR)?;

        let url = format!("{}/search/movie", self.base_url);
        debug!("Searching {} for {:?}", url, query);
        let request = self
            .client
            .get(&url)
            .query(&[("api_key", api_key), ("query", query), ("page", "1")]);

        let response: MovieSearchResponse = send_json(PROVIDER, request).await?;
        Ok(self.to_items(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Year, DATA_UNAVAILABLE, PLACEHOLDER_COVER_URL};

    fn source() -> TmdbMovieSource {
        TmdbMovieSource::new(&SourcesSettings::with_base_url("http://127.0.0.1:1")).unwrap()
    }

    #[test]
    fn test_maps_results() {
        let response: MovieSearchResponse = serde_json::from_str(
            r#"{
                "page": 1,
                "results": [
                    {"id": 603, "title": "The Matrix", "poster_path": "/matrix.jpg", "release_date": "1999-03-30"},
                    {"id": 604, "title": "The Matrix Reloaded", "poster_path": null, "release_date": ""}
                ],
                "total_results": 2
            }"#,
        )
        .unwrap();

        let items = source().to_items(response);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "603");
        assert_eq!(items[0].title, "The Matrix");
        assert_eq!(items[0].artist_or_producer, DATA_UNAVAILABLE);
        assert_eq!(
            items[0].cover_image_url,
            "http://127.0.0.1:1/images/matrix.jpg"
        );
        assert_eq!(items[0].year, Year::Known(1999));
        assert_eq!(items[1].cover_image_url, PLACEHOLDER_COVER_URL);
        assert_eq!(items[1].year, Year::Unavailable);
    }

    #[test]
    fn test_missing_results_field_is_empty() {
        let response: MovieSearchResponse = serde_json::from_str(r#"{"page": 1}"#).unwrap();
        assert!(source().to_items(response).is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        // Port 1 is never listening; reaching the network would surface as Network
        let result = source().fetch("matrix").await;
        assert!(matches!(
            result,
            Err(SourceError::Configuration(TMDB_API_KEY_VAR))
        ));
    }
}
