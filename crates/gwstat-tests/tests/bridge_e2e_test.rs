//! End-to-end tests for the telemetry bridge
//!
//! These tests run the full pipeline over real sockets:
//! 1. Start a scripted event-stream server
//! 2. Run `EventsClient` → `ReconnectingConsumer` → `Reporter`
//! 3. Verify the gateway state store and published gauges

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;

use gwstat_client::testing::{ScriptFrame, StreamScript, TestServer};
use gwstat_client::{ConsumerError, EventsClient, ReconnectPolicy, ReconnectingConsumer};
use gwstat_core::testing::RecordingSink;
use gwstat_core::{GatewayStateStore, MetricKind, Reporter, CONNECTION_STATS_EVENT};

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn stats_frame(ids: &[&str], data: serde_json::Value) -> ScriptFrame {
    ScriptFrame::Event(json!({
        "name": CONNECTION_STATS_EVENT,
        "identifiers": ids,
        "data": data,
    }))
}

#[tokio::test]
async fn test_full_pipeline_with_reconnect() {
    let t1 = "2023-11-14T22:13:20Z";
    let t2 = "2023-11-14T22:15:00Z";
    let t3 = "2023-11-14T22:16:40Z";

    // First connection: two stats events around a canceled hiccup,
    // then the server drops the stream. Second connection: a multi-id
    // event, an unparseable frame, and a wholesale-replacing update.
    // After that the script is exhausted, so reconnection fails and
    // the consumer escalates.
    let script = StreamScript::new(vec![
        vec![
            stats_frame(&["gw1"], json!({ "uplink_count": 3, "last_uplink_received_at": t1 })),
            ScriptFrame::Status {
                code: 1,
                message: "context canceled".into(),
            },
            stats_frame(&["gw1"], json!({ "uplink_count": 5, "last_uplink_received_at": t2 })),
        ],
        vec![
            stats_frame(&["gwA", "gwB"], json!({ "uplink_count": 7 })),
            ScriptFrame::Raw("garbage that is not json".into()),
            stats_frame(&["gwA"], json!({ "connected_at": t3, "downlink_count": 0 })),
        ],
    ]);
    let server = TestServer::start(script.clone()).await.unwrap();

    let client = Arc::new(EventsClient::new(&server.base_url(), "test-key").unwrap());
    let policy = ReconnectPolicy {
        backoff: Duration::from_millis(5),
        max_attempts: 2,
    };
    let consumer = ReconnectingConsumer::with_policy(
        client,
        vec!["gw1".into(), "gwA".into(), "gwB".into()],
        policy,
    );

    let store = GatewayStateStore::new();
    let sink = Arc::new(RecordingSink::new());
    let reporter = Reporter::new(store.clone(), sink.clone());

    let (tx, rx) = mpsc::channel(16);
    let consumer_task = tokio::spawn(consumer.run(tx));
    let reporter_task = tokio::spawn(reporter.run(rx));

    let result = timeout(Duration::from_secs(10), consumer_task)
        .await
        .expect("pipeline should finish")
        .unwrap();
    timeout(Duration::from_secs(10), reporter_task)
        .await
        .expect("reporter should stop")
        .unwrap();

    // The script ran out of connections, so the outage escalated
    assert!(matches!(
        result,
        Err(ConsumerError::ReconnectExhausted { attempts: 2, .. })
    ));
    assert_eq!(script.remaining_connections(), 0);

    // gw1: the later event won, nothing merged from the earlier one
    let gw1 = store.get("gw1").unwrap();
    assert_eq!(gw1.stats.uplink_count, 5);
    assert_eq!(gw1.stats.last_uplink_at, Some(ts(1_700_000_100)));
    assert_eq!(gw1.stats.downlink_count, 0);
    assert_eq!(sink.count("gw1", MetricKind::Uplink), Some(5));
    assert_eq!(sink.time("gw1", MetricKind::Uplink), Some(1_700_000_100));

    // gwB kept the fan-out value from the multi-id event
    let gwb = store.get("gwB").unwrap();
    assert_eq!(gwb.stats.uplink_count, 7);
    assert_eq!(sink.count("gwB", MetricKind::Uplink), Some(7));

    // gwA was replaced wholesale by the final event: connected, no
    // traffic counters, and the zero downlink published no gauge
    let gwa = store.get("gwA").unwrap();
    assert_eq!(gwa.stats.connected_at, Some(ts(1_700_000_200)));
    assert_eq!(gwa.stats.uplink_count, 0);
    assert_eq!(sink.time("gwA", MetricKind::Connect), Some(1_700_000_200));
    assert_eq!(sink.count("gwA", MetricKind::Downlink), None);

    server.shutdown().await;
}

#[tokio::test]
async fn test_metrics_exposition_end_to_end() {
    let handle = gwstat_metrics::install_recorder().unwrap();
    let store = GatewayStateStore::new();
    let sink = Arc::new(gwstat_metrics::PrometheusSink::new());
    let reporter = Reporter::new(store.clone(), sink);

    reporter.apply(&gwstat_core::StatsEvent {
        gateway_ids: vec!["gw-exp".into()],
        stats: gwstat_core::ConnectionStats {
            connected_at: Some(ts(1_700_000_000)),
            uplink_count: 9,
            last_uplink_at: Some(ts(1_700_000_100)),
            ..Default::default()
        },
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = gwstat_metrics::create_router(handle, store);
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    let base = format!("http://{}", addr);

    let metrics = reqwest::get(format!("{}/metrics", base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(metrics.contains("gateway_count"));
    assert!(metrics.contains("gateway_time"));
    assert!(metrics.contains("gateway=\"gw-exp\""));
    assert!(metrics.contains("type=\"uplink\""));
    assert!(metrics.contains("type=\"connect\""));

    let gateways: serde_json::Value = reqwest::get(format!("{}/gateways", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(gateways["gateways"][0]["id"], "gw-exp");
    assert_eq!(gateways["gateways"][0]["uplink_count"], 9);
}
