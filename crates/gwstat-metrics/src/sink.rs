//! Prometheus-backed metrics sink

use gwstat_core::{MetricKind, MetricsSink};
use metrics::gauge;

/// Gauge holding the unix timestamp of the most recent observation,
/// labeled by `gateway` and `type`.
pub const GATEWAY_TIME: &str = "gateway_time";

/// Gauge holding the cumulative count reported by the source, labeled
/// by `gateway` and `type`.
pub const GATEWAY_COUNT: &str = "gateway_count";

/// Publishes gauges through the process-global `metrics` recorder.
///
/// Counters arrive as absolute values from the source, so they are
/// exposed as gauges rather than Prometheus counters; the bridge
/// never increments anything itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusSink;

impl PrometheusSink {
    pub fn new() -> Self {
        Self
    }
}

impl MetricsSink for PrometheusSink {
    fn set_time(&self, gateway: &str, kind: MetricKind, unix_secs: i64) {
        gauge!(GATEWAY_TIME, "gateway" => gateway.to_string(), "type" => kind.as_str())
            .set(unix_secs as f64);
    }

    fn set_count(&self, gateway: &str, kind: MetricKind, count: u64) {
        gauge!(GATEWAY_COUNT, "gateway" => gateway.to_string(), "type" => kind.as_str())
            .set(count as f64);
    }
}
