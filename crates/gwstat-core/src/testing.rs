//! Test utilities for gwstat-core
//!
//! An in-memory metrics sink so reporter behavior can be asserted
//! deterministically without a metrics registry.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::sink::{MetricKind, MetricsSink};

/// A `MetricsSink` that records every gauge update in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    times: Mutex<HashMap<(String, MetricKind), i64>>,
    counts: Mutex<HashMap<(String, MetricKind), u64>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last recorded timestamp gauge for a gateway/kind pair
    pub fn time(&self, gateway: &str, kind: MetricKind) -> Option<i64> {
        self.times.lock().get(&(gateway.to_string(), kind)).copied()
    }

    /// Last recorded count gauge for a gateway/kind pair
    pub fn count(&self, gateway: &str, kind: MetricKind) -> Option<u64> {
        self.counts.lock().get(&(gateway.to_string(), kind)).copied()
    }

    /// True if no gauge of either kind has been set
    pub fn is_empty(&self) -> bool {
        self.times.lock().is_empty() && self.counts.lock().is_empty()
    }
}

impl MetricsSink for RecordingSink {
    fn set_time(&self, gateway: &str, kind: MetricKind, unix_secs: i64) {
        self.times
            .lock()
            .insert((gateway.to_string(), kind), unix_secs);
    }

    fn set_count(&self, gateway: &str, kind: MetricKind, count: u64) {
        self.counts
            .lock()
            .insert((gateway.to_string(), kind), count);
    }
}
