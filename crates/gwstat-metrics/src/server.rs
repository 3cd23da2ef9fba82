//! HTTP surface for metrics scraping and state inspection

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use gwstat_core::{GatewayStateStore, GatewayStats};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tower_http::trace::TraceLayer;

/// State shared across the exposition handlers
#[derive(Clone)]
struct AppState {
    handle: PrometheusHandle,
    store: GatewayStateStore,
}

/// Create the exposition router:
/// - `GET /metrics`: Prometheus text exposition
/// - `GET /health`: liveness probe
/// - `GET /gateways`: JSON view of the current per-gateway snapshots
pub fn create_router(handle: PrometheusHandle, store: GatewayStateStore) -> Router {
    Router::new()
        .route("/metrics", get(render_metrics))
        .route("/health", get(|| async { "OK" }))
        .route("/gateways", get(list_gateways))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { handle, store })
}

async fn render_metrics(State(state): State<AppState>) -> String {
    state.handle.render()
}

async fn list_gateways(State(state): State<AppState>) -> Json<serde_json::Value> {
    let gateways: Vec<GatewayStats> = state
        .store
        .snapshot()
        .iter()
        .map(|gw| (**gw).clone())
        .collect();

    Json(json!({ "gateways": gateways }))
}
