//! In-memory gateway state store

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::stats::GatewayStats;

/// Latest-known state per gateway, keyed by gateway id.
///
/// The reporter task is the only writer; metrics readers run
/// concurrently. Entries are replaced wholesale as `Arc<GatewayStats>`
/// so a reader always observes one event's fields together, never a
/// torn mix of two updates. Records live for the process lifetime;
/// there is no eviction.
#[derive(Debug, Clone, Default)]
pub struct GatewayStateStore {
    inner: Arc<RwLock<HashMap<String, Arc<GatewayStats>>>>,
}

impl GatewayStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a gateway's snapshot with a new one, creating the entry
    /// on first sight of that gateway id.
    pub fn replace(&self, stats: GatewayStats) {
        let mut inner = self.inner.write();
        inner.insert(stats.id.clone(), Arc::new(stats));
    }

    /// Current snapshot for one gateway, if any event has named it yet
    pub fn get(&self, id: &str) -> Option<Arc<GatewayStats>> {
        self.inner.read().get(id).cloned()
    }

    /// All current snapshots, sorted by gateway id for deterministic
    /// output ordering.
    pub fn snapshot(&self) -> Vec<Arc<GatewayStats>> {
        let mut all: Vec<_> = self.inner.read().values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Number of gateways observed so far
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::ConnectionStats;

    fn stats_with_uplinks(id: &str, uplink_count: u64) -> GatewayStats {
        GatewayStats::new(
            id,
            ConnectionStats {
                uplink_count,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_replace_is_wholesale() {
        let store = GatewayStateStore::new();

        store.replace(GatewayStats::new(
            "gw1",
            ConnectionStats {
                uplink_count: 3,
                downlink_count: 9,
                ..Default::default()
            },
        ));
        store.replace(stats_with_uplinks("gw1", 5));

        let current = store.get("gw1").unwrap();
        assert_eq!(current.stats.uplink_count, 5);
        // downlink_count from the first event must not leak through
        assert_eq!(current.stats.downlink_count, 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_unknown_gateway() {
        let store = GatewayStateStore::new();
        assert!(store.get("nope").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_sorted_by_id() {
        let store = GatewayStateStore::new();
        store.replace(stats_with_uplinks("gw-b", 1));
        store.replace(stats_with_uplinks("gw-a", 2));
        store.replace(stats_with_uplinks("gw-c", 3));

        let ids: Vec<_> = store.snapshot().iter().map(|g| g.id.clone()).collect();
        assert_eq!(ids, vec!["gw-a", "gw-b", "gw-c"]);
    }

    #[test]
    fn test_readers_keep_old_snapshot_across_replace() {
        let store = GatewayStateStore::new();
        store.replace(stats_with_uplinks("gw1", 1));

        let before = store.get("gw1").unwrap();
        store.replace(stats_with_uplinks("gw1", 2));

        // A reader holding the old Arc still sees a consistent record
        assert_eq!(before.stats.uplink_count, 1);
        assert_eq!(store.get("gw1").unwrap().stats.uplink_count, 2);
    }
}
