//! gwstat-core - Core types and aggregation logic for the gwstat telemetry bridge
//!
//! This crate holds everything that does not touch the network: the
//! per-gateway statistics model, the event decoder, the in-memory state
//! store, the metrics sink abstraction, and the reporter that ties them
//! together. Transport lives in `gwstat-client`; metrics exposition in
//! `gwstat-metrics`.

pub mod event;
pub mod reporter;
pub mod sink;
pub mod stats;
pub mod store;
pub mod testing;

pub use event::{decode_event, Decoded, EventEnvelope, StatsEvent, CONNECTION_STATS_EVENT};
pub use reporter::Reporter;
pub use sink::{MetricKind, MetricsSink};
pub use stats::{ConnectionStats, GatewayStats};
pub use store::GatewayStateStore;
