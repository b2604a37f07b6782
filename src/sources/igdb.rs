//! Game search through IGDB.
//!
//! IGDB sits behind Twitch's OAuth client-credential grant: every search
//! first exchanges the client id and secret for an app access token, then
//! posts an Apicalypse query with that token as a bearer credential. Tokens
//! are not cached, so each search re-authenticates.

use anyhow::Result;
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{build_http_client, require_credential, send_json, SourceAdapter, SourceError};
use crate::catalog::{normalize, CollectionItem, MediaType};
use crate::config::{SourcesSettings, IGDB_CLIENT_ID_VAR, IGDB_CLIENT_SECRET_VAR};

const PROVIDER: &str = "IGDB";
const TOKEN_PROVIDER: &str = "Twitch OAuth";

const GAME_FIELDS: &str = "name,cover.url,first_release_date,genres.name,\
involved_companies.company.name,involved_companies.developer";

#[derive(Debug, Deserialize)]
struct AppAccessToken {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct IgdbGame {
    id: u64,
    name: Option<String>,
    cover: Option<IgdbCover>,
    first_release_date: Option<i64>,
    #[serde(default)]
    genres: Vec<Named>,
    #[serde(default)]
    involved_companies: Vec<InvolvedCompany>,
}

#[derive(Debug, Deserialize)]
struct IgdbCover {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InvolvedCompany {
    company: Option<Named>,
    #[serde(default)]
    developer: bool,
}

pub struct IgdbGameSource {
    client: Client,
    client_id: Option<String>,
    client_secret: Option<String>,
    token_url: String,
    base_url: String,
    limit: usize,
}

impl IgdbGameSource {
    pub fn new(settings: &SourcesSettings) -> Result<Self> {
        Ok(Self {
            client: build_http_client(settings.request_timeout_secs)?,
            client_id: settings.igdb_client_id.clone(),
            client_secret: settings.igdb_client_secret.clone(),
            token_url: settings.endpoints.twitch_token_url.clone(),
            base_url: settings
                .endpoints
                .igdb_base_url
                .trim_end_matches('/')
                .to_string(),
            limit: settings.result_limit,
        })
    }

    async fn fetch_token(&self, client_id: &str, client_secret: &str) -> Result<String, SourceError> {
        let request = self.client.post(&self.token_url).query(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("grant_type", "client_credentials"),
        ]);
        let token: AppAccessToken = send_json(TOKEN_PROVIDER, request).await?;
        Ok(token.access_token)
    }
}

/// Builds the Apicalypse body for a name search.
fn search_body(query: &str, limit: usize) -> String {
    let escaped = query.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        "search \"{}\"; fields {}; limit {};",
        escaped, GAME_FIELDS, limit
    )
}

/// IGDB hands out protocol-relative thumbnail urls; ask for the larger cover.
fn cover_url(raw: &str) -> String {
    let absolute = if raw.starts_with("//") {
        format!("https:{}", raw)
    } else {
        raw.to_string()
    };
    absolute.replace("/t_thumb/", "/t_cover_big/")
}

fn studio(game: &IgdbGame) -> Option<String> {
    let company_name = |c: &InvolvedCompany| c.company.as_ref().and_then(|n| n.name.clone());
    game.involved_companies
        .iter()
        .filter(|c| c.developer)
        .find_map(company_name)
        .or_else(|| game.involved_companies.iter().find_map(company_name))
        .or_else(|| game.genres.iter().find_map(|g| g.name.clone()))
}

fn to_items(games: Vec<IgdbGame>) -> Vec<CollectionItem> {
    games
        .into_iter()
        .map(|game| {
            let release_date = game
                .first_release_date
                .and_then(|ts| DateTime::from_timestamp(ts, 0))
                .map(|dt| dt.format("%Y-%m-%d").to_string());
            let cover = game.cover.as_ref().and_then(|c| c.url.as_deref()).map(cover_url);
            normalize(
                game.id.to_string(),
                MediaType::Game,
                game.name.as_deref(),
                studio(&game).as_deref(),
                cover.as_deref(),
                release_date.as_deref(),
            )
        })
        .collect()
}

#[async_trait]
impl SourceAdapter for IgdbGameSource {
    fn media_type(&self) -> MediaType {
        MediaType::Game
    }

    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, query: &str) -> Result<Vec<CollectionItem>, SourceError> {
        let client_id = require_credential(&self.client_id, IGDB_CLIENT_ID_VAR)?;
        let client_secret = require_credential(&self.client_secret, IGDB_CLIENT_SECRET_VAR)?;

        // TODO: reuse the token until `expires_in` elapses instead of one grant per search
        let token = self.fetch_token(client_id, client_secret).await?;

        let url = format!("{}/games", self.base_url);
        debug!("Searching {} for {:?}", url, query);
        let request = self
            .client
            .post(&url)
            .header("Client-ID", client_id)
            .bearer_auth(token)
            .body(search_body(query, self.limit));

        let games: Vec<IgdbGame> = send_json(PROVIDER, request).await?;
        Ok(to_items(games))
    }
}
