//! Test utilities for gwstat-client
//!
//! An in-process event-stream server driven by a per-connection script
//! of frames, so stream consumption and reconnection can be exercised
//! over real sockets.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;

/// One frame a scripted connection will emit
#[derive(Debug, Clone)]
pub enum ScriptFrame {
    /// An ordinary data frame carrying this JSON payload
    Event(serde_json::Value),
    /// An `event: error` frame carrying an in-band stream status
    Status { code: u32, message: String },
    /// A data frame with a raw, possibly unparseable payload
    Raw(String),
}

/// Shared script state: each stream connection consumes the next entry
#[derive(Debug, Clone, Default)]
pub struct StreamScript {
    connections: Arc<Mutex<VecDeque<Vec<ScriptFrame>>>>,
    gateways: Arc<Vec<serde_json::Value>>,
}

impl StreamScript {
    /// Script with the given per-connection frame lists and an empty
    /// gateway listing.
    pub fn new(connections: Vec<Vec<ScriptFrame>>) -> Self {
        Self {
            connections: Arc::new(Mutex::new(connections.into())),
            gateways: Arc::new(Vec::new()),
        }
    }

    /// Additionally serve these ids from the gateway listing endpoint
    pub fn with_gateways(mut self, ids: &[&str]) -> Self {
        self.gateways = Arc::new(
            ids.iter()
                .map(|id| json!({ "id": id, "name": format!("Gateway {}", id) }))
                .collect(),
        );
        self
    }

    fn next_connection(&self) -> Option<Vec<ScriptFrame>> {
        self.connections.lock().unwrap().pop_front()
    }

    /// Connections not yet consumed by a stream request
    pub fn remaining_connections(&self) -> usize {
        self.connections.lock().unwrap().len()
    }
}

/// Build the server routes backed by a script
pub fn script_router(script: StreamScript) -> Router {
    Router::new()
        .route("/api/v1/gateways", get(list_gateways))
        .route("/api/v1/events", get(stream_events))
        .with_state(script)
}

async fn list_gateways(State(script): State<StreamScript>) -> Json<serde_json::Value> {
    Json(json!({ "gateways": &*script.gateways }))
}

async fn stream_events(State(script): State<StreamScript>) -> impl IntoResponse {
    let Some(frames) = script.next_connection() else {
        // Script exhausted: refuse the connection like a dead server
        return (StatusCode::SERVICE_UNAVAILABLE, "no scripted connections left").into_response();
    };

    let stream = async_stream::stream! {
        for frame in frames {
            let event = match frame {
                ScriptFrame::Event(payload) => Event::default().data(payload.to_string()),
                ScriptFrame::Status { code, message } => Event::default()
                    .event("error")
                    .data(json!({ "code": code, "message": message }).to_string()),
                ScriptFrame::Raw(data) => Event::default().data(data),
            };
            yield Ok::<_, Infallible>(event);
        }
        // Stream ends here; the client observes a closed stream
    };

    Sse::new(stream).into_response()
}

/// A scripted event-stream server that shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Bind to an ephemeral port and serve the scripted routes
    pub async fn start(script: StreamScript) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let handle = tokio::spawn(async move {
            axum::serve(listener, script_router(script))
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Base URL clients should talk to
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
