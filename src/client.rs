//! HTTP transport to the remote semantic-search service.
//!
//! A single [`SearchClient`] is built at startup and shared by every tool
//! invocation. It only holds connection settings, so clones are cheap and
//! no locking is needed.
//!
//! # Failure Handling
//!
//! - Network error or timeout → [`SearchError::Transport`]
//! - Any status other than 200 → [`SearchError::Status`] (no retry)
//! - 200 with a body that does not match the envelope → [`SearchError::Deserialize`]
//! - Host cancellation while in flight → [`SearchError::Cancelled`]

use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::endpoints::EndpointKind;
use crate::error::SearchError;
use crate::models::{SearchEnvelope, SearchRequest};

/// Default overall request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest prefix of a non-200 body kept in [`SearchError::Status`].
pub const MAX_ERROR_BODY_CHARS: usize = 512;

/// Reusable client for the document and chunk search endpoints.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
}

impl SearchClient {
    /// Build a client whose requests are bounded by `timeout`.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// `POST` the request to `url` and decode the envelope.
    ///
    /// Returns as soon as `cancel` fires; the in-flight request is dropped.
    pub async fn search<T>(
        &self,
        endpoint: EndpointKind,
        url: &str,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchEnvelope<T>, SearchError>
    where
        T: DeserializeOwned,
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SearchError::Cancelled { endpoint }),
            res = self.post(endpoint, url, request) => res,
        }
    }

    async fn post<T>(
        &self,
        endpoint: EndpointKind,
        url: &str,
        request: &SearchRequest,
    ) -> Result<SearchEnvelope<T>, SearchError>
    where
        T: DeserializeOwned,
    {
        let transport = |source: reqwest::Error| SearchError::Transport {
            endpoint,
            url: url.to_string(),
            source,
        };

        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                endpoint,
                url: url.to_string(),
                status,
                body: truncate_body(body),
            });
        }

        let body = response.text().await.map_err(transport)?;
        serde_json::from_str(&body).map_err(|source| SearchError::Deserialize {
            endpoint,
            url: url.to_string(),
            source,
        })
    }

    /// Probe `GET <origin>/health` of the service hosting `endpoint_url`.
    ///
    /// Healthy means a 2xx answer whose JSON `status` field is `"OK"`.
    /// Every failure, including an unparseable URL, reads as unhealthy.
    pub async fn check_health(&self, endpoint_url: &str) -> bool {
        let Some(health_url) = health_url(endpoint_url) else {
            return false;
        };

        let response = match self.http.get(health_url.as_str()).send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::debug!(url = %health_url, status = %r.status(), "health check rejected");
                return false;
            }
            Err(e) => {
                tracing::debug!(url = %health_url, error = %e, "health check failed");
                return false;
            }
        };

        match response.json::<serde_json::Value>().await {
            Ok(body) => body.get("status").and_then(|s| s.as_str()) == Some("OK"),
            Err(_) => false,
        }
    }
}

fn truncate_body(body: String) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}... ({} bytes total)", &body[..cut], body.len()),
        None => body,
    }
}

/// `http://host:port/api/search/documents` → `http://host:port/health`.
fn health_url(endpoint_url: &str) -> Option<reqwest::Url> {
    let parsed = reqwest::Url::parse(endpoint_url).ok()?;
    parsed.join("/health").ok()
}
