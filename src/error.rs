//! Failure taxonomy for remote search calls.
//!
//! Every variant records which [`EndpointKind`] failed. Callers can tell
//! three situations apart:
//!
//! - the backend is down or rejected the call ([`SearchError::is_transport`]),
//! - the backend answered 200 with a body that breaks the contract
//!   ([`SearchError::is_deserialize`]),
//! - the host cancelled the invocation ([`SearchError::is_cancelled`]).
//!
//! None of these are retried.

use reqwest::StatusCode;
use thiserror::Error;

use crate::endpoints::EndpointKind;

#[derive(Debug, Error)]
pub enum SearchError {
    /// Network failure, timeout, or an unusable URL.
    #[error("{endpoint} request to {url} failed: {source}")]
    Transport {
        endpoint: EndpointKind,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with something other than 200 OK.
    #[error("{endpoint} at {url} returned {status}: {body}")]
    Status {
        endpoint: EndpointKind,
        url: String,
        status: StatusCode,
        body: String,
    },

    /// 200 OK, but the body is not the expected JSON envelope.
    #[error("{endpoint} at {url} returned an invalid response body: {source}")]
    Deserialize {
        endpoint: EndpointKind,
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{endpoint} cancelled")]
    Cancelled { endpoint: EndpointKind },
}

impl SearchError {
    pub fn endpoint(&self) -> EndpointKind {
        match self {
            SearchError::Transport { endpoint, .. }
            | SearchError::Status { endpoint, .. }
            | SearchError::Deserialize { endpoint, .. }
            | SearchError::Cancelled { endpoint } => *endpoint,
        }
    }

    /// Backend unreachable, timed out, or answered with a non-200 status.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SearchError::Transport { .. } | SearchError::Status { .. }
        )
    }

    pub fn is_deserialize(&self) -> bool {
        matches!(self, SearchError::Deserialize { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SearchError::Cancelled { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SearchError::Transport { source, .. } if source.is_timeout())
    }

    /// Observed HTTP status, if the backend answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SearchError::Status { status, .. } => Some(*status),
            SearchError::Transport { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Short machine-readable class, used in tool and HTTP error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::Transport { .. } | SearchError::Status { .. } => "transport",
            SearchError::Deserialize { .. } => "deserialize",
            SearchError::Cancelled { .. } => "cancelled",
        }
    }
}
