//! Search adapters for the external media catalogs.
//!
//! Every provider speaks its own dialect (query-string keys, bearer tokens,
//! wrapped vs. bare result lists); each adapter hides that behind
//! [`SourceAdapter`] and hands back normalized [`CollectionItem`]s.

pub mod dispatcher;
pub mod google_books;
pub mod igdb;
pub mod itunes;
pub mod tmdb;
pub mod tvmaze;

pub use dispatcher::SearchDispatcher;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::catalog::{CollectionItem, MediaType};

/// Errors an adapter can report. The dispatcher passes them through as-is.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Missing {0} in environment or config file")]
    Configuration(&'static str),

    #[error("No search provider registered for {0}")]
    NoProvider(MediaType),

    #[error("{provider} API Error: {status}")]
    Provider { provider: &'static str, status: u16 },

    #[error("Failed to reach {provider}: {source}")]
    Network {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected response from {provider}: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },
}

impl SourceError {
    /// HTTP status reported by the provider, if the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A per-category search provider.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Category this adapter serves.
    fn media_type(&self) -> MediaType;

    /// Short provider name used in logs and error messages.
    fn provider(&self) -> &'static str;

    /// Runs a search and returns normalized results. Zero matches is an
    /// empty list, not an error.
    async fn fetch(&self, query: &str) -> Result<Vec<CollectionItem>, SourceError>;
}

pub(crate) fn build_http_client(timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("entertainment-passport/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

/// Sends a prepared request, maps transport failures and non-2xx statuses,
/// and decodes the JSON body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<T, SourceError> {
    let response = request
        .send()
        .await
        .map_err(|source| SourceError::Network { provider, source })?;
    let response = ensure_success(provider, response)?;
    response
        .json::<T>()
        .await
        .map_err(|e| SourceError::Decode {
            provider,
            message: e.to_string(),
        })
}

fn ensure_success(provider: &'static str, response: Response) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SourceError::Provider {
            provider,
            status: status.as_u16(),
        })
    }
}

pub(crate) fn require_credential<'a>(
    value: &'a Option<String>,
    name: &'static str,
) -> Result<&'a str, SourceError> {
    value.as_deref().ok_or(SourceError::Configuration(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_user_facing() {
        assert_eq!(
            SourceError::Configuration("TMDB_API_KEY").to_string(),
            "Missing TMDB_API_KEY in environment or config file"
        );
        let provider_error = SourceError::Provider {
            provider: "TMDB",
            status: 500,
        };
        assert_eq!(provider_error.to_string(), "TMDB API Error: 500");
        assert_eq!(provider_error.status(), Some(500));
        assert_eq!(SourceError::Configuration("X").status(), None);
    }

    #[test]
    fn test_require_credential() {
        assert_eq!(
            require_credential(&Some("abc".to_string()), "KEY").unwrap(),
            "abc"
        );
        assert!(matches!(
            require_credential(&None, "KEY"),
            Err(SourceError::Configuration("KEY"))
        ));
    }
}
