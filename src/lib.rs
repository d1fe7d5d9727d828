//! # Local Docs
//!
//! **Find relevant local knowledge for AI agents.**
//!
//! Exposes one MCP tool, `localDocumentsSearch`, that turns a free-text
//! prompt into two searches against a remote semantic-search service (one
//! over whole documents, one over text chunks) and merges the results into
//! a single answer.
//!
//! ## Architecture
//!
//! ```text
//!  agent host
//!      │  tools/call localDocumentsSearch
//!      ▼
//! ┌──────────┐   ┌──────────────────────┐   POST /api/search/documents
//! │ McpBridge│──▶│ LocalDocumentsSearch │──┬──────────────────────────▶┐
//! │ / HTTP   │   │   (join both calls)  │  │                           │ search
//! └──────────┘   └──────────┬───────────┘  └──────────────────────────▶│ service
//!                           ▼               POST /api/search/chunks    ┘
//!                      aggregate()
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Request, result, envelope, and answer types |
//! | [`endpoints`] | Endpoint URLs and environment overrides |
//! | [`client`] | HTTP transport with timeout and cancellation |
//! | [`error`] | Transport / deserialization / cancellation taxonomy |
//! | [`aggregate`] | Merge document and chunk results |
//! | [`search`] | The orchestrator and the `search` CLI command |
//! | [`traits`] | `Tool` trait, `ToolContext`, `ToolRegistry` |
//! | [`mcp`] | MCP JSON-RPC bridge |
//! | [`server`] | stdio and HTTP transports |
//! | [`config`] | TOML configuration |
//! | [`logging`] | Tracing subscriber |

pub mod aggregate;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod logging;
pub mod mcp;
pub mod models;
pub mod search;
pub mod server;
pub mod traits;

pub use error::SearchError;
pub use models::{AggregatedAnswer, ChunkResult, DocumentResult, SearchEnvelope, SearchRequest};
pub use search::LocalDocumentsSearch;
pub use traits::{Tool, ToolContext, ToolRegistry};
