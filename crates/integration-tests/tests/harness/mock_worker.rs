//! Mock remote synthesis worker for integration tests
//!
//! Accepts the JSON job the remote backend sends and answers with canned
//! audio, or with a 500 when started in failing mode

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use tokio_util::sync::CancellationToken;

/// Audio the mock returns on success
pub const MOCK_AUDIO: &[u8] = b"RIFF\x24\x00\x00\x00WAVEmock";

/// A received job together with its `Authorization` header
#[derive(Debug, Clone)]
pub struct ReceivedJob {
    pub body: serde_json::Value,
    pub authorization: Option<String>,
}

/// Mock worker that records every job it receives
pub struct MockWorker {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockWorkerState>,
}

struct MockWorkerState {
    /// Body of the 500 response, if the worker fails
    failure: Option<String>,
    jobs: Mutex<Vec<ReceivedJob>>,
}

impl MockWorker {
    /// Start a mock worker that always succeeds
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(None).await
    }

    /// Start a mock worker that always answers 500
    pub async fn start_failing() -> anyhow::Result<Self> {
        Self::start_inner(Some("worker crashed".to_owned())).await
    }

    /// Start a mock worker that answers 500 with the given body
    pub async fn start_failing_with(body: String) -> anyhow::Result<Self> {
        Self::start_inner(Some(body)).await
    }

    async fn start_inner(failure: Option<String>) -> anyhow::Result<Self> {
        let state = Arc::new(MockWorkerState {
            failure,
            jobs: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/synthesize", routing::post(handle_synthesize))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// URL of the synthesis endpoint
    pub fn url(&self) -> String {
        format!("http://{}/synthesize", self.addr)
    }

    /// Jobs received so far
    pub fn jobs(&self) -> Vec<ReceivedJob> {
        self.state.jobs.lock().unwrap().clone()
    }
}

impl Drop for MockWorker {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_synthesize(
    State(state): State<Arc<MockWorkerState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let authorization = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    state.jobs.lock().unwrap().push(ReceivedJob { body, authorization });

    if let Some(ref failure) = state.failure {
        return (StatusCode::INTERNAL_SERVER_ERROR, failure.clone()).into_response();
    }

    (StatusCode::OK, Bytes::from_static(MOCK_AUDIO)).into_response()
}
