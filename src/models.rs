//! Core data models exchanged with the remote search service and the agent.
//!
//! The request is built once per tool invocation and sent to both search
//! endpoints. Responses come back as a [`SearchEnvelope`] whose `results`
//! are ranked best-first by the remote service; nothing here re-sorts them.

use serde::{Deserialize, Serialize};

/// Default minimum similarity for a candidate to count as relevant.
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Body of a `POST` to either search endpoint.
///
/// Serializes to `{ "query": ..., "threshold": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    query: String,
    threshold: f64,
}

impl SearchRequest {
    /// The prompt is forwarded as-is, including empty or blank text.
    pub fn new(query: impl Into<String>, threshold: f64) -> Self {
        Self {
            query: query.into(),
            threshold,
        }
    }
}

/// One match from the document-search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub id: String,
    /// Full text or identifier of the matched document.
    pub document: String,
    pub similarity: f64,
}

/// One match from the chunk-search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkResult {
    pub id: String,
    /// Excerpt text of the matched chunk.
    pub chunk: String,
    pub similarity: f64,
}

/// The `{ success, results }` wrapper returned by the remote service.
///
/// `error` is only present when the backend reports one alongside
/// `success: false`; it is omitted again on serialization when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEnvelope<T> {
    pub success: bool,
    pub results: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> SearchEnvelope<T> {
    pub fn ok(results: Vec<T>) -> Self {
        Self {
            success: true,
            results,
            error: None,
        }
    }
}

/// What the agent receives from `localDocumentsSearch`.
///
/// `best_document` is the whole document envelope, while `best_chunk` is
/// reduced to the top-ranked chunk. `best_chunk` serializes as `null` when
/// the chunk search matched nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedAnswer {
    pub best_document: SearchEnvelope<DocumentResult>,
    pub best_chunk: Option<ChunkResult>,
}
