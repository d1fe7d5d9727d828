//! MCP JSON-RPC protocol bridge.
//!
//! Adapts the [`ToolRegistry`] to the MCP server protocol so agent hosts can
//! discover and call `localDocumentsSearch` over stdio or Streamable HTTP.
//!
//! The host's per-request cancellation token is handed to the tool, so a
//! `notifications/cancelled` from the host aborts both outbound searches.

use std::borrow::Cow;
use std::sync::Arc;

use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler};

use crate::search::LocalDocumentsSearch;
use crate::traits::{ToolContext, ToolError, ToolRegistry};

/// JSON-RPC code reported when the host cancels an in-flight call.
pub const REQUEST_CANCELLED: ErrorCode = ErrorCode(-32800);

/// Bridges the tool registry to the MCP JSON-RPC protocol.
///
/// Each MCP session receives a clone of this struct; the orchestrator and
/// registry are shared.
#[derive(Clone)]
pub struct McpBridge {
    search: LocalDocumentsSearch,
    tools: Arc<ToolRegistry>,
}

impl McpBridge {
    pub fn new(search: LocalDocumentsSearch, tools: Arc<ToolRegistry>) -> Self {
        Self { search, tools }
    }

    /// Convert a registered tool into an rmcp `Tool` descriptor.
    fn to_mcp_tool(tool: &dyn crate::traits::Tool) -> Tool {
        let input_schema: Arc<serde_json::Map<String, serde_json::Value>> =
            match tool.parameters_schema() {
                serde_json::Value::Object(map) => Arc::new(map),
                _ => Arc::new(serde_json::Map::new()),
            };

        Tool {
            name: Cow::Owned(tool.name().to_string()),
            title: None,
            description: Some(Cow::Owned(tool.description().to_string())),
            input_schema,
            output_schema: None,
            annotations: Some(ToolAnnotations::new().read_only(true)),
            execution: None,
            icons: None,
            meta: None,
        }
    }
}

/// Map a tool failure onto the MCP result/error split.
///
/// Bad parameters and cancellation are protocol errors. Backend failures
/// are reported as an errored tool result so the agent can read them.
pub fn tool_error_to_mcp(name: &str, err: ToolError) -> Result<CallToolResult, McpError> {
    match err {
        ToolError::InvalidParams(msg) => Err(McpError::invalid_params(
            format!("{}: {}", name, msg),
            None,
        )),
        ToolError::Search(e) if e.is_cancelled() => Err(McpError::new(
            REQUEST_CANCELLED,
            format!("{}: {}", name, e),
            None,
        )),
        ToolError::Search(e) => {
            let payload = serde_json::json!({
                "error": {
                    "kind": e.kind(),
                    "endpoint": e.endpoint(),
                    "status": e.status().map(|s| s.as_u16()),
                    "message": e.to_string(),
                }
            });
            let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| e.to_string());
            Ok(CallToolResult::error(vec![Content::text(text)]))
        }
        ToolError::Internal(msg) => Err(McpError::internal_error(
            format!("{}: {}", name, msg),
            None,
        )),
    }
}

impl ServerHandler for McpBridge {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "local-docs".to_string(),
                title: Some("Local Documents Search".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Use localDocumentsSearch to find the local documents and the single text \
                 chunk most relevant to a natural-language prompt."
                    .to_string(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools: Vec<Tool> = self
            .tools
            .tools()
            .iter()
            .map(|t| Self::to_mcp_tool(t.as_ref()))
            .collect();
        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        self.tools.find(name).map(Self::to_mcp_tool)
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool = self.tools.find(&request.name).ok_or_else(|| {
            McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("no tool registered with name: {}", request.name),
                None,
            )
        })?;

        let params = request
            .arguments
            .map(serde_json::Value::Object)
            .unwrap_or(serde_json::Value::Object(serde_json::Map::new()));

        tracing::debug!(tool = %request.name, "mcp tool call");
        let ctx = ToolContext::new(self.search.clone(), context.ct.clone());
        match tool.execute(params, &ctx).await {
            Ok(result) => {
                let text = serde_json::to_string_pretty(&result).unwrap_or_default();
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e) => tool_error_to_mcp(&request.name, e),
        }
    }
}
