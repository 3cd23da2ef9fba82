//! Reporter - applies decoded events to the store and metrics surface

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::event::StatsEvent;
use crate::sink::{MetricKind, MetricsSink};
use crate::stats::GatewayStats;
use crate::store::GatewayStateStore;

/// Consumes the decoded event channel, replaces store entries, and
/// publishes gauges plus one summary log line per affected gateway.
pub struct Reporter {
    store: GatewayStateStore,
    sink: Arc<dyn MetricsSink>,
}

impl Reporter {
    pub fn new(store: GatewayStateStore, sink: Arc<dyn MetricsSink>) -> Self {
        Self { store, sink }
    }

    /// Drain the event channel until it closes.
    ///
    /// The channel closing means the consumer task is gone; the
    /// reporter simply stops, leaving the last published state visible
    /// to scrapers.
    pub async fn run(self, mut rx: mpsc::Receiver<StatsEvent>) {
        while let Some(event) = rx.recv().await {
            self.apply(&event);
        }
        debug!("event channel closed, reporter stopping");
    }

    /// Apply one recognized event: the same stats replace the snapshot
    /// of every gateway the event names, in sorted id order so the
    /// summary output is deterministic across runs.
    pub fn apply(&self, event: &StatsEvent) {
        let mut ids: Vec<&str> = event.gateway_ids.iter().map(String::as_str).collect();
        ids.sort_unstable();

        for id in ids {
            let stats = GatewayStats::new(id, event.stats.clone());
            self.publish(&stats);
            info!(gateway_id = %id, "Gateway {}", stats.summary());
            self.store.replace(stats);
        }
    }

    /// Push a snapshot's non-zero fields to the metrics sink.
    ///
    /// Zero counters and unset timestamps are suppressed so a gauge
    /// never reports a sample for a never-observed metric.
    fn publish(&self, gw: &GatewayStats) {
        let s = &gw.stats;

        if let Some(t) = s.connected_at {
            self.sink.set_time(&gw.id, MetricKind::Connect, t.timestamp());
        }
        if s.uplink_count != 0 {
            self.sink.set_count(&gw.id, MetricKind::Uplink, s.uplink_count);
            if let Some(t) = s.last_uplink_at {
                self.sink.set_time(&gw.id, MetricKind::Uplink, t.timestamp());
            }
        }
        if s.downlink_count != 0 {
            self.sink
                .set_count(&gw.id, MetricKind::Downlink, s.downlink_count);
            if let Some(t) = s.last_downlink_at {
                self.sink.set_time(&gw.id, MetricKind::Downlink, t.timestamp());
            }
        }
        if s.tx_ack_count != 0 {
            self.sink.set_count(&gw.id, MetricKind::TxAck, s.tx_ack_count);
            if let Some(t) = s.last_tx_ack_at {
                self.sink.set_time(&gw.id, MetricKind::TxAck, t.timestamp());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::ConnectionStats;
    use crate::testing::RecordingSink;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn reporter() -> (Reporter, GatewayStateStore, Arc<RecordingSink>) {
        let store = GatewayStateStore::new();
        let sink = Arc::new(RecordingSink::new());
        let reporter = Reporter::new(store.clone(), sink.clone());
        (reporter, store, sink)
    }

    fn uplink_event(ids: &[&str], count: u64, last_at: i64) -> StatsEvent {
        StatsEvent {
            gateway_ids: ids.iter().map(|s| s.to_string()).collect(),
            stats: ConnectionStats {
                uplink_count: count,
                last_uplink_at: Some(ts(last_at)),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_latest_event_wins() {
        let (reporter, store, _sink) = reporter();

        reporter.apply(&StatsEvent {
            gateway_ids: vec!["gw1".into()],
            stats: ConnectionStats {
                uplink_count: 3,
                downlink_count: 4,
                last_uplink_at: Some(ts(100)),
                ..Default::default()
            },
        });
        reporter.apply(&uplink_event(&["gw1"], 5, 200));

        let current = store.get("gw1").unwrap();
        assert_eq!(current.stats.uplink_count, 5);
        assert_eq!(current.stats.last_uplink_at, Some(ts(200)));
        // wholesale replacement: the old downlink count is gone
        assert_eq!(current.stats.downlink_count, 0);
    }

    #[test]
    fn test_zero_fields_publish_no_gauges() {
        let (reporter, _store, sink) = reporter();

        reporter.apply(&StatsEvent {
            gateway_ids: vec!["gwA".into()],
            stats: ConnectionStats::default(),
        });

        assert!(sink.is_empty());
    }

    #[test]
    fn test_nonzero_fields_publish_time_and_count() {
        let (reporter, _store, sink) = reporter();

        reporter.apply(&StatsEvent {
            gateway_ids: vec!["gw1".into()],
            stats: ConnectionStats {
                connected_at: Some(ts(50)),
                uplink_count: 7,
                last_uplink_at: Some(ts(150)),
                ..Default::default()
            },
        });

        assert_eq!(sink.time("gw1", MetricKind::Connect), Some(50));
        assert_eq!(sink.count("gw1", MetricKind::Uplink), Some(7));
        assert_eq!(sink.time("gw1", MetricKind::Uplink), Some(150));
        assert_eq!(sink.count("gw1", MetricKind::Downlink), None);
        assert_eq!(sink.time("gw1", MetricKind::Downlink), None);
        assert_eq!(sink.count("gw1", MetricKind::TxAck), None);
    }

    #[test]
    fn test_multi_id_fan_out() {
        let (reporter, store, sink) = reporter();

        reporter.apply(&uplink_event(&["gwB", "gwA"], 7, 100));

        for id in ["gwA", "gwB"] {
            assert_eq!(store.get(id).unwrap().stats.uplink_count, 7);
            assert_eq!(sink.count(id, MetricKind::Uplink), Some(7));
        }
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_two_events_around_a_gap() {
        // Two updates for the same gateway with a stream hiccup
        // between them: exactly two store mutations, the later wins.
        let (reporter, store, _sink) = reporter();

        reporter.apply(&uplink_event(&["gw1"], 3, 100));
        reporter.apply(&uplink_event(&["gw1"], 5, 200));

        let current = store.get("gw1").unwrap();
        assert_eq!(current.stats.uplink_count, 5);
        assert_eq!(current.stats.last_uplink_at, Some(ts(200)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_run_drains_channel_until_closed() {
        let (reporter, store, _sink) = reporter();
        let (tx, rx) = mpsc::channel(8);

        let handle = tokio::spawn(reporter.run(rx));

        tx.send(uplink_event(&["gw1"], 1, 100)).await.unwrap();
        tx.send(uplink_event(&["gw1"], 2, 200)).await.unwrap();
        drop(tx);

        handle.await.unwrap();
        assert_eq!(store.get("gw1").unwrap().stats.uplink_count, 2);
    }
}
