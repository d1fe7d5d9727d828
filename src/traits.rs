//! Tool abstraction shared by the MCP bridge and the HTTP API.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │         ToolRegistry         │
//! │  ┌────────────────────────┐  │
//! │  │  localDocumentsSearch  │  │
//! │  └────────────────────────┘  │
//! └──────────────┬───────────────┘
//!        ┌───────┴────────┐
//!        ▼                ▼
//!   McpBridge        POST /tools/{name}
//! ```
//!
//! Every invocation gets a fresh [`ToolContext`] carrying the shared
//! orchestrator and the caller's cancellation token.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::error::SearchError;
use crate::search::LocalDocumentsSearch;

/// Why a tool invocation failed.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("internal: {0}")]
    Internal(String),
}

/// An operation agents can discover and call.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name used in `tools/list` and as the route segment of `POST /tools/{name}`.
    fn name(&self) -> &str;

    /// One-line description for agent discovery.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's parameters (`type: "object"`).
    fn parameters_schema(&self) -> Value;

    /// Execute with the caller's parameters (always a JSON object).
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value, ToolError>;
}

/// Per-invocation context handed to [`Tool::execute`].
pub struct ToolContext {
    search: LocalDocumentsSearch,
    cancel: CancellationToken,
}

impl ToolContext {
    pub fn new(search: LocalDocumentsSearch, cancel: CancellationToken) -> Self {
        Self { search, cancel }
    }

    pub fn search(&self) -> &LocalDocumentsSearch {
        &self.search
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Finds the best-matching local document and text chunk for a prompt.
///
/// Calls without a `threshold` use `default_threshold`, which is also the
/// default advertised in the parameter schema.
pub struct LocalDocumentsSearchTool {
    default_threshold: f64,
}

impl LocalDocumentsSearchTool {
    pub fn new(default_threshold: f64) -> Self {
        Self { default_threshold }
    }
}

#[async_trait]
impl Tool for LocalDocumentsSearchTool {
    fn name(&self) -> &str {
        "localDocumentsSearch"
    }

    fn description(&self) -> &str {
        "Search the local knowledge base for the documents and the single text chunk most relevant to a prompt"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "prompt": { "type": "string", "description": "Natural-language query" },
                "threshold": {
                    "type": "number",
                    "description": "Minimum similarity score (0.0-1.0)",
                    "minimum": 0.0,
                    "maximum": 1.0,
                    "default": self.default_threshold
                }
            },
            "required": ["prompt"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        // Empty prompts are forwarded to the backend unchanged.
        let prompt = params
            .get("prompt")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidParams("prompt must be a string".to_string()))?;

        let threshold = match params.get("threshold") {
            None | Some(Value::Null) => self.default_threshold,
            Some(v) => v.as_f64().ok_or_else(|| {
                ToolError::InvalidParams("threshold must be a number".to_string())
            })?,
        };

        let answer = ctx
            .search()
            .search(prompt, threshold, ctx.cancellation())
            .await?;

        serde_json::to_value(&answer)
            .map_err(|e| ToolError::Internal(format!("unserializable answer: {}", e)))
    }
}

/// Registry of tools exposed to agents.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Registry pre-loaded with `localDocumentsSearch`.
    pub fn with_builtins(default_threshold: f64) -> Self {
        let mut registry = Self { tools: Vec::new() };
        registry.register(Box::new(LocalDocumentsSearchTool::new(default_threshold)));
        registry
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn tools(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    pub fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }
}
