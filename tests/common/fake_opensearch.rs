//! Fake OpenSearch cluster for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves:
//! - `GET /`: cluster info
//! - `POST /{index}/_doc`: index with a generated id
//! - `PUT /{index}/_doc/{id}`: index under the given id
//!
//! Index requests are answered from a queue of scripted status codes and
//! then with `201 Created`. Every request is recorded with its `refresh`
//! parameter and decoded body.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// One index request the fake answered.
#[derive(Debug, Clone)]
pub struct IndexRequest {
    pub method: &'static str,
    pub index: String,
    pub id: Option<String>,
    pub refresh: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Default)]
struct ClusterState {
    probe_status: Option<u16>,
    script: VecDeque<u16>,
    requests: Vec<IndexRequest>,
    next_id: u64,
}

type Shared = Arc<Mutex<ClusterState>>;

/// Handle to the running fake cluster.
pub struct FakeOpenSearch {
    addr: SocketAddr,
    state: Shared,
}

impl FakeOpenSearch {
    /// Start the server on a random port. Returns once it is listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ClusterState::default()));

        let app = Router::new()
            .route("/", get(cluster_info))
            .route("/{index}/_doc", post(index_generated))
            .route("/{index}/_doc/{id}", put(index_with_id))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the task a moment to register.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        Ok(Self { addr, state })
    }

    /// Base URL of the cluster (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Answer the next index request with `status`.
    pub async fn respond_with(&self, status: u16) {
        self.state.lock().await.script.push_back(status);
    }

    /// Answer `GET /` with `status` instead of 200.
    pub async fn fail_probe(&self, status: u16) {
        self.state.lock().await.probe_status = Some(status);
    }

    /// Every index request so far, in arrival order.
    pub async fn requests(&self) -> Vec<IndexRequest> {
        self.state.lock().await.requests.clone()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

async fn cluster_info(State(state): State<Shared>) -> Response {
    let status = state.lock().await.probe_status.unwrap_or(200);
    if status != 200 {
        return error(status);
    }
    axum::Json(serde_json::json!({
        "name": "opensearch-node1",
        "cluster_name": "opensearch-cluster",
        "version": { "distribution": "opensearch", "number": "2.11.0" },
        "tagline": "The OpenSearch Project: https://opensearch.org/"
    }))
    .into_response()
}

async fn index_generated(
    Path(index): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Shared>,
    body: Bytes,
) -> Response {
    record(state, "POST", index, None, params, body).await
}

async fn index_with_id(
    Path((index, id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Shared>,
    body: Bytes,
) -> Response {
    record(state, "PUT", index, Some(id), params, body).await
}

async fn record(
    state: Shared,
    method: &'static str,
    index: String,
    id: Option<String>,
    params: HashMap<String, String>,
    body: Bytes,
) -> Response {
    let mut state = state.lock().await;
    state.requests.push(IndexRequest {
        method,
        index: index.clone(),
        id: id.clone(),
        refresh: params.get("refresh").cloned(),
        body: serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null),
    });

    let status = state.script.pop_front().unwrap_or(201);
    if status != 201 {
        return error(status);
    }
    state.next_id += 1;
    let id = id.unwrap_or_else(|| format!("gen-{}", state.next_id));
    (
        StatusCode::CREATED,
        axum::Json(serde_json::json!({
            "_index": index,
            "_id": id,
            "_version": 1,
            "result": "created",
            "_shards": { "total": 2, "successful": 1, "failed": 0 }
        })),
    )
        .into_response()
}

fn error(status: u16) -> Response {
    let (kind, reason) = match status {
        400 => ("mapper_parsing_exception", "failed to parse field [size]"),
        429 => ("es_rejected_execution_exception", "rejected execution of coordinating operation"),
        503 => ("unavailable_shards_exception", "primary shard is not active"),
        _ => ("exception", "unexpected failure"),
    };
    let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        code,
        axum::Json(serde_json::json!({
            "error": { "root_cause": [], "type": kind, "reason": reason },
            "status": status
        })),
    )
        .into_response()
}
