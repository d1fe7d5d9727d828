//! In-process mock of the remote semantic-search service.

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use local_docs::client::SearchClient;
use local_docs::endpoints::Endpoints;
use local_docs::LocalDocumentsSearch;

/// Canned answer for one endpoint.
#[derive(Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Reply {
    pub fn json(body: serde_json::Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A request the backend received: path and decoded JSON body.
#[derive(Debug, Clone)]
pub struct Call {
    pub path: String,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct MockState {
    documents: Reply,
    chunks: Reply,
    calls: Arc<Mutex<Vec<Call>>>,
    completed: Arc<Mutex<Vec<String>>>,
}

pub struct MockBackend {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<Call>>>,
    completed: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    pub fn documents_url(&self) -> String {
        format!("http://{}/api/search/documents", self.addr)
    }

    pub fn chunks_url(&self) -> String {
        format!("http://{}/api/search/chunks", self.addr)
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(self.documents_url(), self.chunks_url())
    }

    pub fn orchestrator(&self, timeout: Duration) -> LocalDocumentsSearch {
        LocalDocumentsSearch::new(SearchClient::new(timeout).unwrap(), self.endpoints(), 0.7)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }

    /// Paths whose handler ran to completion (delay elapsed).
    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

async fn respond(state: &MockState, path: &str, reply: &Reply, body: Bytes) -> impl IntoResponse {
    let body = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    state.calls.lock().unwrap().push(Call {
        path: path.to_string(),
        body,
    });
    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }
    state.completed.lock().unwrap().push(path.to_string());
    (
        StatusCode::from_u16(reply.status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        reply.body.clone(),
    )
}

async fn documents(State(state): State<MockState>, body: Bytes) -> impl IntoResponse {
    let reply = state.documents.clone();
    respond(&state, "/api/search/documents", &reply, body).await
}

async fn chunks(State(state): State<MockState>, body: Bytes) -> impl IntoResponse {
    let reply = state.chunks.clone();
    respond(&state, "/api/search/chunks", &reply, body).await
}

async fn health() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        r#"{"status":"OK"}"#,
    )
}

pub async fn spawn(documents_reply: Reply, chunks_reply: Reply) -> MockBackend {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let completed = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        documents: documents_reply,
        chunks: chunks_reply,
        calls: calls.clone(),
        completed: completed.clone(),
    };

    let app = Router::new()
        .route("/api/search/documents", post(documents))
        .route("/api/search/chunks", post(chunks))
        .route("/health", get(health))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend {
        addr,
        calls,
        completed,
    }
}

pub fn france_documents() -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "results": [{ "id": "doc1", "document": "France facts", "similarity": 0.91 }]
    })
}

pub fn france_chunks() -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "results": [
            { "id": "c1", "chunk": "Paris is the capital", "similarity": 0.95 },
            { "id": "c2", "chunk": "...", "similarity": 0.80 }
        ]
    })
}
