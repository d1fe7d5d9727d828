//! Server transports: MCP over stdio, and an HTTP server that carries both
//! a plain JSON tool API and MCP Streamable HTTP.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Server version and backend reachability |
//! | `GET`  | `/tools/list` | List registered tools with schemas |
//! | `POST` | `/tools/{name}` | Call a tool by name |
//! | `*`    | `/mcp` | MCP Streamable HTTP endpoint |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "backend_unavailable", "message": "document search at ... returned 500 ..." } }
//! ```
//!
//! | Code | Status | Cause |
//! |------|--------|-------|
//! | `bad_request` | 400 | Missing or mistyped parameters |
//! | `not_found` | 404 | Unknown tool |
//! | `backend_unavailable` | 502 | Backend unreachable or non-200 |
//! | `backend_contract` | 502 | Backend returned an unparseable body |
//! | `timeout` | 504 | Backend did not answer within the timeout |
//! | `cancelled` | 499 | Invocation was cancelled |
//! | `internal` | 500 | Anything else |
//!
//! # Agent Host Integration
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "local-docs": {
//!       "command": "local-docs",
//!       "args": ["serve", "stdio"]
//!     }
//!   }
//! }
//! ```

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use rmcp::ServiceExt;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::mcp::McpBridge;
use crate::search::LocalDocumentsSearch;
use crate::traits::{ToolContext, ToolError, ToolRegistry};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    search: LocalDocumentsSearch,
    tools: Arc<ToolRegistry>,
}

impl AppState {
    pub fn new(search: LocalDocumentsSearch, tools: Arc<ToolRegistry>) -> Self {
        Self { search, tools }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let search = LocalDocumentsSearch::from_config(config)?;
        let tools = ToolRegistry::with_builtins(config.search.default_threshold);
        Ok(Self::new(search, Arc::new(tools)))
    }

    fn bridge(&self) -> McpBridge {
        McpBridge::new(self.search.clone(), self.tools.clone())
    }
}

/// Serve MCP over stdin/stdout until the host closes the stream.
pub async fn run_stdio(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    tracing::info!(
        documents = %state.search.endpoints().documents,
        chunks = %state.search.endpoints().chunks,
        "serving MCP over stdio"
    );

    let running = state.bridge().serve(rmcp::transport::stdio()).await?;
    let reason = running.waiting().await?;
    tracing::info!(?reason, "stdio session ended");
    Ok(())
}

/// Bind to `[server].bind` and serve until the process is terminated.
pub async fn run_http(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %listener.local_addr()?, "HTTP server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the HTTP router. Exposed for in-process tests.
pub fn router(state: AppState) -> Router {
    let bridge = state.bridge();
    let mcp_service = StreamableHttpService::new(
        move || Ok(bridge.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/tools/list", get(handle_list_tools))
        .route("/tools/{name}", post(handle_tool_call))
        .route("/health", get(handle_health))
        .nest_service("/mcp", mcp_service)
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Client-closed-request, as used by nginx.
const CLIENT_CLOSED_REQUEST: u16 = 499;

fn classify_tool_error(tool_name: &str, err: ToolError) -> AppError {
    let message = format!("{}: {}", tool_name, err);
    match err {
        ToolError::InvalidParams(_) => AppError::new(StatusCode::BAD_REQUEST, "bad_request", message),
        ToolError::Search(e) if e.is_cancelled() => AppError::new(
            StatusCode::from_u16(CLIENT_CLOSED_REQUEST).unwrap_or(StatusCode::REQUEST_TIMEOUT),
            "cancelled",
            message,
        ),
        ToolError::Search(e) if e.is_timeout() => {
            AppError::new(StatusCode::GATEWAY_TIMEOUT, "timeout", message)
        }
        ToolError::Search(e) if e.is_deserialize() => {
            AppError::new(StatusCode::BAD_GATEWAY, "backend_contract", message)
        }
        ToolError::Search(_) => AppError::new(StatusCode::BAD_GATEWAY, "backend_unavailable", message),
        ToolError::Internal(_) => {
            AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    backend: BackendHealth,
}

#[derive(Serialize)]
struct BackendHealth {
    documents: bool,
    chunks: bool,
}

/// The server itself is always `"ok"`; backend reachability is reported
/// separately per endpoint.
async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let client = state.search.client();
    let endpoints = state.search.endpoints();
    let (documents, chunks) = tokio::join!(
        client.check_health(&endpoints.documents),
        client.check_health(&endpoints.chunks),
    );

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: BackendHealth { documents, chunks },
    })
}

// ============ GET /tools/list ============

#[derive(Serialize)]
struct ToolInfo {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Serialize)]
struct ToolListResponse {
    tools: Vec<ToolInfo>,
}

async fn handle_list_tools(State(state): State<AppState>) -> Json<ToolListResponse> {
    let tools = state
        .tools
        .tools()
        .iter()
        .map(|t| ToolInfo {
            name: t.name().to_string(),
            description: t.description().to_string(),
            parameters: t.parameters_schema(),
        })
        .collect();

    Json(ToolListResponse { tools })
}

// ============ POST /tools/{name} ============

/// Dispatch a tool call. The result is wrapped as `{ "result": ... }`.
///
/// If the client disconnects, the handler future is dropped and the drop
/// guard cancels any in-flight backend calls.
async fn handle_tool_call(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(params): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tool = state.tools.find(&name).ok_or_else(|| {
        AppError::new(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("no tool registered with name: {}", name),
        )
    })?;

    if !params.is_object() {
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "bad_request",
            "parameters must be a JSON object",
        ));
    }

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let ctx = ToolContext::new(state.search.clone(), cancel);

    let result = tool
        .execute(params, &ctx)
        .await
        .map_err(|e| classify_tool_error(&name, e))?;

    Ok(Json(serde_json::json!({ "result": result })))
}
