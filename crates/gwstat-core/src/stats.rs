//! Per-gateway connection statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp format used in summary lines
const TIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Connection statistics as carried by a single stats event.
///
/// Counters are absolute values reported by the source, not local
/// increments; a zero counter means the source has not observed that
/// traffic kind yet. Missing wire fields deserialize to the same
/// zero/`None` defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStats {
    /// When the gateway last established its connection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<DateTime<Utc>>,
    /// Cumulative uplink message count
    #[serde(default)]
    pub uplink_count: u64,
    /// When the last uplink was received
    #[serde(
        default,
        rename = "last_uplink_received_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_uplink_at: Option<DateTime<Utc>>,
    /// Cumulative downlink message count
    #[serde(default)]
    pub downlink_count: u64,
    /// When the last downlink was received
    #[serde(
        default,
        rename = "last_downlink_received_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_downlink_at: Option<DateTime<Utc>>,
    /// Cumulative transmission-acknowledgment count
    #[serde(default, rename = "tx_acknowledgment_count")]
    pub tx_ack_count: u64,
    /// When the last transmission acknowledgment was received
    #[serde(
        default,
        rename = "last_tx_acknowledgment_received_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_tx_ack_at: Option<DateTime<Utc>>,
}

/// Latest known state of one gateway.
///
/// One instance exists per gateway id and is replaced wholesale each
/// time a recognized stats event names that gateway; fields from an
/// older event never survive into a newer snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayStats {
    /// Opaque gateway identifier
    pub id: String,
    /// Statistics carried by the most recent event for this gateway
    #[serde(flatten)]
    pub stats: ConnectionStats,
}

impl GatewayStats {
    /// Build a snapshot for one gateway from an event's stats payload
    pub fn new(id: impl Into<String>, stats: ConnectionStats) -> Self {
        Self {
            id: id.into(),
            stats,
        }
    }

    /// Render the one-line human-readable summary for this gateway.
    ///
    /// Zero-valued counters and unset timestamps are omitted entirely,
    /// so a gateway that has only connected reads
    /// `gw1 connected: 2026-01-02 15:04:05` with no traffic clauses.
    pub fn summary(&self) -> String {
        let s = &self.stats;
        let mut parts = vec![self.id.clone()];

        if let Some(t) = s.connected_at {
            parts.push(format!("connected: {}", t.format(TIME_FMT)));
        }
        if s.uplink_count != 0 {
            parts.push(counter_clause("uplinks", s.uplink_count, s.last_uplink_at));
        }
        if s.downlink_count != 0 {
            parts.push(counter_clause(
                "downlinks",
                s.downlink_count,
                s.last_downlink_at,
            ));
        }
        if s.tx_ack_count != 0 {
            parts.push(counter_clause("txAck", s.tx_ack_count, s.last_tx_ack_at));
        }

        parts.join(" ")
    }
}

fn counter_clause(label: &str, count: u64, last: Option<DateTime<Utc>>) -> String {
    match last {
        Some(t) => format!("{}: {} (last {})", label, count, t.format(TIME_FMT)),
        None => format!("{}: {}", label, count),
    }
}
