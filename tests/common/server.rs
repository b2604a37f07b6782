//! Stand-in for every search provider, served from one local axum app.
//!
//! Routes mirror the paths `SourcesSettings::with_base_url` points the
//! adapters at. Every request is recorded so tests can assert on what was
//! (or was not) sent.

use super::constants::*;
use super::fixtures;
use axum::body::to_bytes;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use entertainment_passport::config::SourcesSettings;
use reqwest::Url;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: String,
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    forced_status: Arc<Mutex<Option<StatusCode>>>,
}

/// Mock provider server
///
/// When dropped, the server shuts down.
pub struct MockProviders {
    pub base_url: String,
    state: MockState,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockProviders {
    pub async fn spawn() -> Self {
        let state = MockState::default();
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Mock provider server failed");
        });

        let server = Self {
            base_url,
            state,
            _shutdown_tx: Some(shutdown_tx),
        };
        server.wait_for_ready().await;
        server
    }

    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Mock providers did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }
            match client.get(format!("{}/health", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    self.clear_requests();
                    return;
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }

    /// Settings with every credential present.
    pub fn settings(&self) -> SourcesSettings {
        SourcesSettings {
            tmdb_api_key: Some(TMDB_KEY.to_string()),
            igdb_client_id: Some(IGDB_CLIENT_ID.to_string()),
            igdb_client_secret: Some(IGDB_CLIENT_SECRET.to_string()),
            google_books_api_key: Some(GOOGLE_BOOKS_KEY.to_string()),
            ..SourcesSettings::with_base_url(&self.base_url)
        }
    }

    /// Settings with no credentials at all.
    pub fn settings_without_credentials(&self) -> SourcesSettings {
        SourcesSettings::with_base_url(&self.base_url)
    }

    /// Makes every following request fail with `status`.
    pub fn fail_with(&self, status: StatusCode) {
        *self.state.forced_status.lock().unwrap() = Some(status);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    fn clear_requests(&self) {
        self.state.requests.lock().unwrap().clear();
    }
}

impl Drop for MockProviders {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn query_pairs(raw: &str) -> HashMap<String, String> {
    Url::parse(&format!("http://mock{}", raw))
        .map(|url| url.query_pairs().into_owned().collect())
        .unwrap_or_default()
}

fn is_bearer(headers: &HeaderMap, token: &str) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", token))
        .unwrap_or(false)
}

async fn handle(State(state): State<MockState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, usize::MAX).await.unwrap_or_default();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();
    let recorded = RecordedRequest {
        method: parts.method.clone(),
        path: parts.uri.path().to_string(),
        query: query_pairs(&path_and_query),
        headers: parts.headers.clone(),
        body: String::from_utf8_lossy(&body).to_string(),
    };
    state.requests.lock().unwrap().push(recorded.clone());

    if let Some(status) = *state.forced_status.lock().unwrap() {
        return (status, "provider unavailable").into_response();
    }

    let param = |name: &str| recorded.query.get(name).cloned().unwrap_or_default();

    match (recorded.method.as_str(), recorded.path.as_str()) {
        ("GET", "/health") => StatusCode::OK.into_response(),
        ("GET", "/tmdb/search/movie") => {
            if param("api_key") != TMDB_KEY {
                return StatusCode::UNAUTHORIZED.into_response();
            }
            Json(fixtures::tmdb_movies(&param("query"))).into_response()
        }
        ("GET", "/tvmaze/search/shows") => {
            Json(fixtures::tvmaze_shows(&param("q"))).into_response()
        }
        ("POST", "/twitch/token") => {
            if param("client_id") != IGDB_CLIENT_ID
                || param("client_secret") != IGDB_CLIENT_SECRET
                || param("grant_type") != "client_credentials"
            {
                return StatusCode::BAD_REQUEST.into_response();
            }
            Json(fixtures::twitch_token()).into_response()
        }
        ("POST", "/igdb/games") => {
            let client_id = recorded
                .headers
                .get("client-id")
                .and_then(|v| v.to_str().ok());
            if client_id != Some(IGDB_CLIENT_ID)
                || !is_bearer(&recorded.headers, IGDB_ACCESS_TOKEN)
            {
                return StatusCode::UNAUTHORIZED.into_response();
            }
            Json(fixtures::igdb_games(&recorded.body)).into_response()
        }
        ("GET", "/proxy/raw") => {
            let target = param("url");
            let term = Url::parse(&target)
                .ok()
                .and_then(|url| {
                    url.query_pairs()
                        .find(|(k, _)| k == "term")
                        .map(|(_, v)| v.into_owned())
                })
                .unwrap_or_default();
            Json(fixtures::itunes_albums(&term)).into_response()
        }
        ("GET", "/books/volumes") => {
            if param("key") != GOOGLE_BOOKS_KEY {
                return StatusCode::FORBIDDEN.into_response();
            }
            Json(fixtures::google_volumes(&param("q"))).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}
