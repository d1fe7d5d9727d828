//! MCP Streamable HTTP at `/mcp`, driven the way an agent host drives it.

mod common;

use common::{france_chunks, france_documents, spawn, MockBackend, Reply};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

use local_docs::server::{router, AppState};
use local_docs::{AggregatedAnswer, ChunkResult, DocumentResult, SearchEnvelope, ToolRegistry};

async fn start_server(backend: &MockBackend) -> String {
    let state = AppState::new(
        backend.orchestrator(Duration::from_secs(30)),
        Arc::new(ToolRegistry::with_builtins(0.7)),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{}/mcp", addr)
}

async fn post(
    http: &reqwest::Client,
    url: &str,
    session_id: Option<&str>,
    message: &Value,
) -> reqwest::Response {
    let mut req = http
        .post(url)
        .header("Accept", "application/json, text/event-stream")
        .json(message);
    if let Some(id) = session_id {
        req = req.header("Mcp-Session-Id", id);
    }
    req.send().await.unwrap()
}

/// The JSON-RPC message answering `id`, from either an SSE or a JSON body.
async fn read_reply(resp: reqwest::Response, id: u64) -> Option<Value> {
    let body = resp.text().await.unwrap();
    let messages: Vec<Value> = if body.trim_start().starts_with('{') {
        serde_json::from_str(&body).into_iter().collect()
    } else {
        body.lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .filter_map(|data| serde_json::from_str(data.trim()).ok())
            .collect()
    };
    messages.into_iter().find(|m| m["id"] == json!(id))
}

/// An initialized MCP session.
#[derive(Clone)]
struct Session {
    http: reqwest::Client,
    url: String,
    id: String,
}

impl Session {
    async fn open(url: &str) -> Self {
        let http = reqwest::Client::new();
        let init = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2025-03-26",
                "capabilities": {},
                "clientInfo": { "name": "local-docs-tests", "version": "0.0.0" }
            }
        });
        let resp = post(&http, url, None, &init).await;
        assert!(resp.status().is_success(), "initialize: {}", resp.status());
        let id = resp
            .headers()
            .get("mcp-session-id")
            .expect("session id header")
            .to_str()
            .unwrap()
            .to_string();
        let reply = read_reply(resp, 1).await.expect("initialize reply");
        assert_eq!(reply["result"]["serverInfo"]["name"], "local-docs");

        let session = Self {
            http,
            url: url.to_string(),
            id,
        };
        let ack = session
            .send(&json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }))
            .await;
        assert!(ack.status().is_success());
        session
    }

    async fn send(&self, message: &Value) -> reqwest::Response {
        post(&self.http, &self.url, Some(&self.id), message).await
    }

    async fn request(&self, id: u64, method: &str, params: Value) -> Option<Value> {
        let message = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        read_reply(self.send(&message).await, id).await
    }
}

#[tokio::test]
async fn test_tools_call_returns_answer() {
    let backend = spawn(Reply::json(france_documents()), Reply::json(france_chunks())).await;
    let session = Session::open(&start_server(&backend).await).await;

    let listed = session.request(2, "tools/list", json!({})).await.unwrap();
    assert_eq!(listed["result"]["tools"][0]["name"], "localDocumentsSearch");

    let reply = session
        .request(
            3,
            "tools/call",
            json!({
                "name": "localDocumentsSearch",
                "arguments": { "prompt": "what is the capital of France?" }
            }),
        )
        .await
        .expect("tools/call reply");

    let result = &reply["result"];
    assert_ne!(result["isError"], json!(true));
    let text = result["content"][0]["text"].as_str().unwrap();

    let answer: AggregatedAnswer = serde_json::from_str(text).unwrap();
    assert_eq!(
        answer,
        AggregatedAnswer {
            best_document: SearchEnvelope::ok(vec![DocumentResult {
                id: "doc1".to_string(),
                document: "France facts".to_string(),
                similarity: 0.91,
            }]),
            best_chunk: Some(ChunkResult {
                id: "c1".to_string(),
                chunk: "Paris is the capital".to_string(),
                similarity: 0.95,
            }),
        }
    );

    // Keys keep declaration order.
    let at = |key: &str| text.find(key).unwrap();
    assert!(at("bestDocument") < at("bestChunk"));
    assert!(at("\"success\"") < at("\"results\""));

    assert_eq!(backend.calls().len(), 2);
}

#[tokio::test]
async fn test_backend_failure_is_error_result() {
    let backend = spawn(Reply::raw(500, "boom"), Reply::json(france_chunks())).await;
    let session = Session::open(&start_server(&backend).await).await;

    let reply = session
        .request(
            2,
            "tools/call",
            json!({ "name": "localDocumentsSearch", "arguments": { "prompt": "q" } }),
        )
        .await
        .unwrap();

    assert_eq!(reply["result"]["isError"], json!(true));
    let text = reply["result"]["content"][0]["text"].as_str().unwrap();
    let payload: Value = serde_json::from_str(text).unwrap();
    assert_eq!(payload["error"]["kind"], "transport");
    assert_eq!(payload["error"]["endpoint"], "document_search");
    assert_eq!(payload["error"]["status"], 500);
}

#[tokio::test]
async fn test_host_cancellation_aborts_backend_calls() {
    let slow = Duration::from_millis(1500);
    let backend = spawn(
        Reply::json(france_documents()).delayed(slow),
        Reply::json(france_chunks()).delayed(slow),
    )
    .await;
    let session = Session::open(&start_server(&backend).await).await;

    let caller = session.clone();
    let started = Instant::now();
    let call = tokio::spawn(async move {
        caller
            .request(
                2,
                "tools/call",
                json!({ "name": "localDocumentsSearch", "arguments": { "prompt": "q" } }),
            )
            .await
    });

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(backend.calls().len(), 2);

    let ack = session
        .send(&json!({
            "jsonrpc": "2.0",
            "method": "notifications/cancelled",
            "params": { "requestId": 2, "reason": "user aborted" }
        }))
        .await;
    assert!(ack.status().is_success());

    let reply = tokio::time::timeout(Duration::from_secs(1), call)
        .await
        .expect("call should end soon after cancellation")
        .unwrap();
    assert!(started.elapsed() < slow);
    if let Some(reply) = reply {
        assert!(reply.get("error").is_some(), "unexpected reply: {}", reply);
    }

    // Past the backend delay: a leaked request would have completed by now.
    tokio::time::sleep(slow).await;
    assert!(backend.completed().is_empty());
}
