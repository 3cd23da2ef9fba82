//! Metrics sink abstraction
//!
//! The reporter publishes gauges through this trait instead of
//! reaching into the process-global metrics registry, so tests can
//! substitute an in-memory sink and assert on exactly what was set.

/// The metric kinds published per gateway.
///
/// Each kind contributes a timestamp gauge; the three counted kinds
/// also contribute a count gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Connect,
    Uplink,
    Downlink,
    TxAck,
}

impl MetricKind {
    /// Label value used on the exposition surface
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Connect => "connect",
            MetricKind::Uplink => "uplink",
            MetricKind::Downlink => "downlink",
            MetricKind::TxAck => "txack",
        }
    }
}

/// Destination for per-gateway gauges, keyed by `(gateway, kind)`
pub trait MetricsSink: Send + Sync {
    /// Set the timestamp gauge for a gateway/kind pair (unix seconds)
    fn set_time(&self, gateway: &str, kind: MetricKind, unix_secs: i64);

    /// Set the count gauge for a gateway/kind pair
    fn set_count(&self, gateway: &str, kind: MetricKind, count: u64);
}
