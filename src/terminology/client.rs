use std::time::{Duration, Instant};

use parking_lot::Mutex;
use reqwest::{Client, StatusCode, header};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::config::TerminologyConfig;
use super::error::TerminologyError;
use crate::constants::TOKEN_EXPIRY_MARGIN_SECS;

const ERROR_BODY_PREVIEW_CHARS: usize = 200;

/// One search hit. `title` may still contain markup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TerminologyEntity {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
}

impl TerminologyEntity {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            title: title.into(),
        }
    }
}

/// Free-text search against an external terminology.
pub trait TerminologyClient: Send + Sync {
    /// Returns at most `limit` entities for `text`.
    fn search(
        &self,
        text: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<TerminologyEntity>, TerminologyError>> + Send;

    /// Whether the client holds what it needs to reach its service.
    fn is_configured(&self) -> bool {
        true
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(rename = "destinationEntities", default)]
    destination_entities: Vec<TerminologyEntity>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// ICD-11 API client (OAuth2 client credentials + entity search).
pub struct Icd11Client {
    http: Client,
    config: TerminologyConfig,
    token: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for Icd11Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Icd11Client")
            .field("config", &self.config)
            .field("token_cached", &self.token.lock().is_some())
            .finish()
    }
}

impl Icd11Client {
    pub fn new(config: TerminologyConfig) -> Result<Self, TerminologyError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(TerminologyError::Client)?;

        if !config.has_credentials() {
            warn!("ICD client credentials not configured; diagnosis lookups will fail");
        }

        Ok(Self {
            http,
            config,
            token: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &TerminologyConfig {
        &self.config
    }

    /// Drops the cached token so the next search requests a fresh one.
    pub fn invalidate_token(&self) {
        self.token.lock().take();
    }

    fn cached_token(&self) -> Option<String> {
        let guard = self.token.lock();
        guard
            .as_ref()
            .filter(|token| Instant::now() < token.expires_at)
            .map(|token| token.value.clone())
    }

    fn map_send_error(
        &self,
        error: reqwest::Error,
        wrap: fn(reqwest::Error) -> TerminologyError,
    ) -> TerminologyError {
        if error.is_timeout() {
            TerminologyError::Timeout {
                secs: self.config.timeout.as_secs(),
            }
        } else {
            wrap(error)
        }
    }

    /// Returns a bearer token, fetching one if none is cached or it is about to expire.
    pub async fn access_token(&self) -> Result<String, TerminologyError> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }

        let (Some(client_id), Some(client_secret)) =
            (&self.config.client_id, &self.config.client_secret)
        else {
            return Err(TerminologyError::MissingCredentials);
        };

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
            ("scope", self.config.scope.as_str()),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| self.map_send_error(e, TerminologyError::TokenRequest))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TerminologyError::TokenRejected {
                status: status.as_u16(),
                body: preview(&body),
            });
        }

        let token: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| TerminologyError::InvalidResponse {
                    reason: format!("token response: {e}"),
                })?;

        let lifetime = token
            .expires_in
            .map(|secs| secs.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS))
            .filter(|secs| *secs > 0);

        match lifetime {
            Some(secs) => {
                *self.token.lock() = Some(CachedToken {
                    value: token.access_token.clone(),
                    expires_at: Instant::now() + Duration::from_secs(secs),
                });
                info!(valid_for_secs = secs, "Obtained ICD access token");
            }
            None => debug!("Obtained ICD access token without usable expiry; not cached"),
        }

        Ok(token.access_token)
    }
}

impl TerminologyClient for Icd11Client {
    fn is_configured(&self) -> bool {
        self.config.has_credentials()
    }

    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn search(
        &self,
        text: &str,
        limit: usize,
    ) -> Result<Vec<TerminologyEntity>, TerminologyError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .get(&self.config.search_url)
            .query(&[("q", text)])
            .bearer_auth(&token)
            .header(header::ACCEPT, "application/json")
            .header(header::ACCEPT_LANGUAGE, &self.config.language)
            .header("API-Version", &self.config.api_version)
            .send()
            .await
            .map_err(|e| self.map_send_error(e, TerminologyError::SearchRequest))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("ICD search rejected the access token; discarding it");
            self.invalidate_token();
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TerminologyError::SearchRejected {
                status: status.as_u16(),
                body: preview(&body),
            });
        }

        let body: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| TerminologyError::InvalidResponse {
                    reason: format!("search response: {e}"),
                })?;

        let mut entities = body.destination_entities;
        entities.truncate(limit);
        debug!(hits = entities.len(), "ICD search complete");
        Ok(entities)
    }
}

fn preview(body: &str) -> String {
    body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect()
}
