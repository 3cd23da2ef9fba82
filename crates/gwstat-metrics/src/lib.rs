//! gwstat-metrics - Prometheus exposition for the gwstat telemetry bridge
//!
//! `PrometheusSink` publishes the reporter's per-gateway gauges through
//! the `metrics` facade; `install_recorder` wires up the Prometheus
//! recorder; `create_router` serves the scrape endpoint plus a small
//! JSON view of the current gateway state.

pub mod recorder;
pub mod server;
pub mod sink;

pub use recorder::{install_recorder, MetricsError};
pub use server::create_router;
pub use sink::{PrometheusSink, GATEWAY_COUNT, GATEWAY_TIME};
