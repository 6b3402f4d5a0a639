//! Shared session state and lazy token refresh

use super::token::{ApiToken, IndexDesc};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::network::{ApiRequest, HttpClient};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Token, index list and request counter shared by all searches of a session
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub api_token: Option<ApiToken>,
    pub indices: Vec<IndexDesc>,
    /// Requests issued with the current token
    pub counter: i64,
}

impl SessionState {
    /// Whether the current token can be used without a refresh
    pub fn is_fresh(&self, now: f64, margin: f64) -> bool {
        self.api_token
            .as_ref()
            .map(|t| t.is_usable(now, self.counter, margin))
            .unwrap_or(false)
    }
}

/// Body of the token issuance endpoint
#[derive(Debug, Deserialize)]
struct InitResponse {
    token: ApiToken,
    #[serde(default)]
    indices: Vec<IndexDesc>,
}

/// Handle on the session state
///
/// Clones share the same state. The mutex is held across the whole
/// check-and-refresh, so at most one token request is in flight and callers
/// racing on an expired token all observe the single refreshed token.
#[derive(Clone)]
pub struct Session {
    client: HttpClient,
    init_url: String,
    search_url: String,
    search_timeout: Duration,
    refresh_margin: f64,
    state: Arc<Mutex<SessionState>>,
}

impl Session {
    /// Create a session on top of an existing client
    pub fn new(client: HttpClient, settings: &Settings) -> Self {
        Self {
            client,
            init_url: settings.init_url(),
            search_url: settings.search_url(),
            search_timeout: settings.outgoing.search_timeout(),
            refresh_margin: settings.session.refresh_margin,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// Build the client and session, fetching the CSRF cookie first in dev mode
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let client = HttpClient::with_settings(&settings.outgoing)?;
        if settings.backend.dev_mode {
            debug!("Dev mode, fetching CSRF cookie from {}", settings.backend.address);
            client.bootstrap_csrf(&settings.backend.address).await?;
        }
        Ok(Self::new(client, settings))
    }

    /// HTTP client used by this session
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Search endpoint of the API backend
    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    /// Deadline for search requests
    pub fn search_timeout(&self) -> Duration {
        self.search_timeout
    }

    /// Return a state with a token valid for further requests, requesting a
    /// new token and index list if needed
    pub async fn refresh(&self) -> Result<SessionState> {
        let mut state = self.state.lock().await;
        if state.is_fresh(now(), self.refresh_margin) {
            return Ok(state.clone());
        }

        let init = self.request_token().await.map_err(|e| {
            warn!("Token refresh failed: {}", e);
            Error::invalid_state(e)
        })?;

        info!(
            "Obtained API token valid for {}s, quota {}, {} indices",
            init.token.max_age,
            init.token.quota,
            init.indices.len()
        );
        state.api_token = Some(init.token);
        state.indices = IndexDesc::dedup(init.indices);
        state.counter = 0;

        Ok(state.clone())
    }

    async fn request_token(&self) -> Result<InitResponse> {
        let response = self
            .client
            .execute(ApiRequest::post(&self.init_url).xsrf())
            .await?;
        response.json()
    }

    /// Current API token, refreshed if necessary
    pub async fn api_token(&self) -> Result<ApiToken> {
        self.refresh()
            .await?
            .api_token
            .ok_or_else(|| Error::invalid_state(Error::Config("no API token issued".to_string())))
    }

    /// Indices available to this session, refreshed if necessary
    pub async fn available_indices(&self) -> Result<Vec<IndexDesc>> {
        Ok(self.refresh().await?.indices)
    }

    /// Count one more request against the current token's quota
    pub async fn record_request(&self) -> i64 {
        let mut state = self.state.lock().await;
        state.counter += 1;
        state.counter
    }

    pub async fn request_count(&self) -> i64 {
        self.state.lock().await.counter
    }

    /// Forget the current token so the next call requests a new one
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.api_token = None;
    }
}

fn now() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
