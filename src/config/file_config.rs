use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub db_path: Option<String>,
    pub export_dir: Option<String>,

    pub sources: Option<SourcesConfig>,
}

/// `[sources]` table. Credentials set here win over the environment.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SourcesConfig {
    pub tmdb_api_key: Option<String>,
    pub igdb_client_id: Option<String>,
    pub igdb_client_secret: Option<String>,
    pub google_books_api_key: Option<String>,

    pub request_timeout_secs: Option<u64>,
    pub result_limit: Option<usize>,

    // Endpoint overrides
    pub tmdb_base_url: Option<String>,
    pub tmdb_image_base_url: Option<String>,
    pub tvmaze_base_url: Option<String>,
    pub twitch_token_url: Option<String>,
    pub igdb_base_url: Option<String>,
    pub itunes_search_url: Option<String>,
    pub cors_proxy_url: Option<String>,
    pub google_books_base_url: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
