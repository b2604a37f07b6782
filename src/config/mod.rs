mod file_config;

pub use file_config::{FileConfig, SourcesConfig};

use anyhow::{bail, Result};
use std::path::PathBuf;

pub const TMDB_API_KEY_VAR: &str = "TMDB_API_KEY";
pub const IGDB_CLIENT_ID_VAR: &str = "IGDB_CLIENT_ID";
pub const IGDB_CLIENT_SECRET_VAR: &str = "IGDB_CLIENT_SECRET";
pub const GOOGLE_BOOKS_API_KEY_VAR: &str = "GOOGLE_BOOKS_API_KEY";

const DEFAULT_DB_FILE: &str = "passport.db";

/// CLI arguments that can be overridden by the TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub export_dir: PathBuf,
    pub sources: SourcesSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments, an optional TOML file and
    /// the process environment. TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        Self::resolve_with_env(cli, file_config, |name| std::env::var(name).ok())
    }

    pub fn resolve_with_env<F>(
        cli: &CliConfig,
        file_config: Option<FileConfig>,
        env: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE));

        if db_path.is_dir() {
            bail!("db_path points to a directory: {:?}", db_path);
        }

        let export_dir = file
            .export_dir
            .map(PathBuf::from)
            .or_else(|| cli.export_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));

        let sources = SourcesSettings::resolve(file.sources.unwrap_or_default(), env)?;

        Ok(Self {
            db_path,
            export_dir,
            sources,
        })
    }
}

/// Provider endpoints. Overridable so a proxy or a local stand-in can be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEndpoints {
    pub tmdb_base_url: String,
    pub tmdb_image_base_url: String,
    pub tvmaze_base_url: String,
    pub twitch_token_url: String,
    pub igdb_base_url: String,
    pub itunes_search_url: String,
    pub cors_proxy_url: String,
    pub google_books_base_url: String,
}

impl Default for SourceEndpoints {
    fn default() -> Self {
        Self {
            tmdb_base_url: "https://api.themoviedb.org/3".to_string(),
            tmdb_image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
            tvmaze_base_url: "https://api.tvmaze.com".to_string(),
            twitch_token_url: "https://id.twitch.tv/oauth2/token".to_string(),
            igdb_base_url: "https://api.igdb.com/v4".to_string(),
            itunes_search_url: "https://itunes.apple.com/search".to_string(),
            cors_proxy_url: "https://api.allorigins.win/raw".to_string(),
            google_books_base_url: "https://www.googleapis.com/books/v1".to_string(),
        }
    }
}

/// Everything the search adapters need, read once when they are built.
#[derive(Clone, Default)]
pub struct SourcesSettings {
    pub tmdb_api_key: Option<String>,
    pub igdb_client_id: Option<String>,
    pub igdb_client_secret: Option<String>,
    pub google_books_api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub result_limit: usize,
    pub endpoints: SourceEndpoints,
}

// Credentials stay out of logs and panic messages.
impl std::fmt::Debug for SourcesSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn redact(value: &Option<String>) -> &'static str {
            if value.is_some() {
                "<set>"
            } else {
                "<unset>"
            }
        }
        f.debug_struct("SourcesSettings")
            .field("tmdb_api_key", &redact(&self.tmdb_api_key))
            .field("igdb_client_id", &redact(&self.igdb_client_id))
            .field("igdb_client_secret", &redact(&self.igdb_client_secret))
            .field("google_books_api_key", &redact(&self.google_books_api_key))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("result_limit", &self.result_limit)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl SourcesSettings {
    fn resolve<F>(file: SourcesConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        let defaults = SourceEndpoints::default();

        let result_limit = file.result_limit.unwrap_or(12);
        if result_limit == 0 {
            bail!("sources.result_limit must be greater than zero");
        }

        Ok(Self {
            tmdb_api_key: non_empty(file.tmdb_api_key)
                .or_else(|| non_empty(env(TMDB_API_KEY_VAR))),
            igdb_client_id: non_empty(file.igdb_client_id)
                .or_else(|| non_empty(env(IGDB_CLIENT_ID_VAR))),
            igdb_client_secret: non_empty(file.igdb_client_secret)
                .or_else(|| non_empty(env(IGDB_CLIENT_SECRET_VAR))),
            google_books_api_key: non_empty(file.google_books_api_key)
                .or_else(|| non_empty(env(GOOGLE_BOOKS_API_KEY_VAR))),
            request_timeout_secs: file.request_timeout_secs.unwrap_or(30),
            result_limit,
            endpoints: SourceEndpoints {
                tmdb_base_url: file.tmdb_base_url.unwrap_or(defaults.tmdb_base_url),
                tmdb_image_base_url: file
                    .tmdb_image_base_url
                    .unwrap_or(defaults.tmdb_image_base_url),
                tvmaze_base_url: file.tvmaze_base_url.unwrap_or(defaults.tvmaze_base_url),
                twitch_token_url: file.twitch_token_url.unwrap_or(defaults.twitch_token_url),
                igdb_base_url: file.igdb_base_url.unwrap_or(defaults.igdb_base_url),
                itunes_search_url: file.itunes_search_url.unwrap_or(defaults.itunes_search_url),
                cors_proxy_url: file.cors_proxy_url.unwrap_or(defaults.cors_proxy_url),
                google_books_base_url: file
                    .google_books_base_url
                    .unwrap_or(defaults.google_books_base_url),
            },
        })
    }

    /// Settings with every endpoint pointed at `base_url`, for local stand-ins.
    pub fn with_base_url(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            request_timeout_secs: 5,
            result_limit: 12,
            endpoints: SourceEndpoints {
                tmdb_base_url: format!("{}/tmdb", base_url),
                tmdb_image_base_url: format!("{}/images", base_url),
                tvmaze_base_url: format!("{}/tvmaze", base_url),
                twitch_token_url: format!("{}/twitch/token", base_url),
                igdb_base_url: format!("{}/igdb", base_url),
                itunes_search_url: format!("{}/itunes/search", base_url),
                cors_proxy_url: format!("{}/proxy/raw", base_url),
                google_books_base_url: format!("{}/books", base_url),
            },
            ..Default::default()
        }
    }
}
