//! Event envelope decoding
//!
//! The upstream stream multiplexes many event kinds; the bridge only
//! understands gateway connection statistics. Decoding is total: every
//! envelope maps to `Recognized`, `Ignored`, or `Malformed`, never a
//! panic, never an aborted consumer loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::ConnectionStats;

/// Name of the single event kind the bridge aggregates
pub const CONNECTION_STATS_EVENT: &str = "gs.gateway.connection.stats";

/// Raw event envelope as carried on the wire.
///
/// `data` stays an opaque JSON value until the event name is known to
/// be one the bridge understands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Event kind, e.g. `gs.gateway.connection.stats`
    pub name: String,
    /// Gateway ids this event applies to
    #[serde(default)]
    pub identifiers: Vec<String>,
    /// When the source emitted the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    /// Kind-specific payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// A recognized connection-stats event, ready to apply to the store.
///
/// One event may name several gateways; the same stats are applied
/// independently to each of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsEvent {
    /// Gateways the statistics apply to
    pub gateway_ids: Vec<String>,
    /// The reported statistics
    pub stats: ConnectionStats,
}

/// Outcome of decoding one envelope
#[derive(Debug)]
pub enum Decoded {
    /// A connection-stats event the reporter should apply
    Recognized(StatsEvent),
    /// An event kind the bridge does not aggregate
    Ignored,
    /// A recognized kind whose payload did not match the stats shape
    Malformed(String),
}

/// Decode an envelope into a domain event.
///
/// Events with an unrecognized name are `Ignored`, as are recognized
/// events naming no gateways. A stats event whose payload fails to
/// deserialize is `Malformed`; callers log and continue.
pub fn decode_event(envelope: &EventEnvelope) -> Decoded {
    if envelope.name != CONNECTION_STATS_EVENT {
        return Decoded::Ignored;
    }
    if envelope.identifiers.is_empty() {
        return Decoded::Ignored;
    }

    let Some(data) = &envelope.data else {
        return Decoded::Malformed("stats event carries no payload".into());
    };

    match serde_json::from_value::<ConnectionStats>(data.clone()) {
        Ok(stats) => Decoded::Recognized(StatsEvent {
            gateway_ids: envelope.identifiers.clone(),
            stats,
        }),
        Err(e) => Decoded::Malformed(format!("stats payload does not match: {}", e)),
    }
}
