//! The `localDocumentsSearch` operation.
//!
//! One invocation issues two independent searches (document-level and
//! chunk-level) with the same query and threshold, runs them concurrently,
//! and joins on both before aggregating. Both must succeed; there is no
//! partial answer. Each call's outcome is logged on its own so a failure in
//! one never hides what happened to the other.

use anyhow::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::aggregate::aggregate;
use crate::client::SearchClient;
use crate::config::Config;
use crate::endpoints::{EndpointKind, Endpoints};
use crate::error::SearchError;
use crate::models::{AggregatedAnswer, ChunkResult, DocumentResult, SearchEnvelope, SearchRequest};

/// Search orchestrator shared by every transport (MCP, HTTP, CLI).
#[derive(Debug, Clone)]
pub struct LocalDocumentsSearch {
    client: SearchClient,
    endpoints: Arc<Endpoints>,
    default_threshold: f64,
}

impl LocalDocumentsSearch {
    pub fn new(client: SearchClient, endpoints: Endpoints, default_threshold: f64) -> Self {
        Self {
            client,
            endpoints: Arc::new(endpoints),
            default_threshold,
        }
    }

    /// Build the client and endpoints from a loaded config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = SearchClient::new(config.timeout())?;
        Ok(Self::new(
            client,
            config.endpoints(),
            config.search.default_threshold,
        ))
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn client(&self) -> &SearchClient {
        &self.client
    }

    pub fn default_threshold(&self) -> f64 {
        self.default_threshold
    }

    /// Run both searches and merge them.
    ///
    /// When both calls fail the document-search error is returned; the
    /// chunk-search error is still logged. Cancellation of `cancel` aborts
    /// both in-flight requests.
    pub async fn search(
        &self,
        prompt: &str,
        threshold: f64,
        cancel: &CancellationToken,
    ) -> Result<AggregatedAnswer, SearchError> {
        let request = SearchRequest::new(prompt, threshold);
        tracing::debug!(threshold, query_len = prompt.len(), "local documents search");

        let documents_url = self.endpoints.resolve(EndpointKind::DocumentSearch);
        let chunks_url = self.endpoints.resolve(EndpointKind::ChunkSearch);

        let (docs, chunks) = tokio::join!(
            self.client.search::<DocumentResult>(
                EndpointKind::DocumentSearch,
                documents_url,
                &request,
                cancel,
            ),
            self.client.search::<ChunkResult>(
                EndpointKind::ChunkSearch,
                chunks_url,
                &request,
                cancel,
            ),
        );

        log_outcome(EndpointKind::DocumentSearch, &docs);
        log_outcome(EndpointKind::ChunkSearch, &chunks);

        Ok(aggregate(docs?, chunks?))
    }
}

fn log_outcome<T>(kind: EndpointKind, outcome: &Result<SearchEnvelope<T>, SearchError>) {
    match outcome {
        Ok(env) if !env.success => tracing::warn!(
            endpoint = %kind,
            error = env.error.as_deref().unwrap_or(""),
            results = env.results.len(),
            "backend reported success=false"
        ),
        Ok(env) => tracing::debug!(endpoint = %kind, results = env.results.len(), "search ok"),
        Err(e) if e.is_cancelled() => tracing::info!(endpoint = %kind, "search cancelled"),
        Err(e) => tracing::warn!(endpoint = %kind, class = e.kind(), error = %e, "search failed"),
    }
}

/// CLI entry point for `local-docs search`.
///
/// Ctrl-C cancels both in-flight requests.
pub async fn run_search(config: &Config, prompt: &str, threshold: Option<f64>) -> Result<()> {
    let search = LocalDocumentsSearch::from_config(config)?;
    let threshold = threshold.unwrap_or(search.default_threshold());

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let outcome = search.search(prompt, threshold, &cancel).await;
    signal_task.abort();

    let answer = outcome?;
    println!("{}", serde_json::to_string_pretty(&answer)?);
    Ok(())
}
