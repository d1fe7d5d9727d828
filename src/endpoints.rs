//! Endpoint resolution for the two remote search kinds.
//!
//! Each kind has its own URL. Both start from the loopback defaults (or the
//! config file) and can then be overridden from the environment:
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `LOCAL_DOCS_SEARCH_URL` | Replaces **both** URLs verbatim |
//! | `LOCAL_DOCS_DOCUMENTS_URL` | Replaces the document-search URL |
//! | `LOCAL_DOCS_CHUNKS_URL` | Replaces the chunk-search URL |
//!
//! Per-kind variables win over the shared one. Empty values count as unset.
//! URLs are not checked for well-formedness here; a bad URL shows up as a
//! transport failure when the call is made.

use serde::Serialize;
use std::fmt;

pub const DEFAULT_DOCUMENTS_URL: &str = "http://localhost:10001/api/search/documents";
pub const DEFAULT_CHUNKS_URL: &str = "http://localhost:10001/api/search/chunks";

pub const ENV_SHARED_URL: &str = "LOCAL_DOCS_SEARCH_URL";
pub const ENV_DOCUMENTS_URL: &str = "LOCAL_DOCS_DOCUMENTS_URL";
pub const ENV_CHUNKS_URL: &str = "LOCAL_DOCS_CHUNKS_URL";

/// Which remote search a call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
    DocumentSearch,
    ChunkSearch,
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointKind::DocumentSearch => f.write_str("document search"),
            EndpointKind::ChunkSearch => f.write_str("chunk search"),
        }
    }
}

/// Resolved target URLs, one per [`EndpointKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoints {
    pub documents: String,
    pub chunks: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            documents: DEFAULT_DOCUMENTS_URL.to_string(),
            chunks: DEFAULT_CHUNKS_URL.to_string(),
        }
    }
}

impl Endpoints {
    pub fn new(documents: impl Into<String>, chunks: impl Into<String>) -> Self {
        Self {
            documents: documents.into(),
            chunks: chunks.into(),
        }
    }

    /// URL for the given search kind.
    pub fn resolve(&self, kind: EndpointKind) -> &str {
        match kind {
            EndpointKind::DocumentSearch => &self.documents,
            EndpointKind::ChunkSearch => &self.chunks,
        }
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// The shared override is applied first, then the per-kind ones.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(shared) = non_empty(ENV_SHARED_URL) {
            self.documents = shared.clone();
            self.chunks = shared;
        }
        if let Some(url) = non_empty(ENV_DOCUMENTS_URL) {
            self.documents = url;
        }
        if let Some(url) = non_empty(ENV_CHUNKS_URL) {
            self.chunks = url;
        }
        self
    }
}
