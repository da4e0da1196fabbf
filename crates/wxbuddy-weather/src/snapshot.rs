//! Short-lived, in-session cache of weather previews keyed by location id.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use wxbuddy_core::Clock;

use crate::types::Snapshot;

/// How long a snapshot stays valid.
pub const SNAPSHOT_TTL_MINUTES: i64 = 15;

/// A cached snapshot and when it was captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub id: String,
    #[serde(flatten)]
    pub snapshot: Snapshot,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot cache with lazy expiry.
///
/// Entries are never swept; an expired entry is removed by the first `get`
/// that sees it.
pub struct WeatherSnapshotCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl WeatherSnapshotCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, Duration::minutes(SNAPSHOT_TTL_MINUTES))
    }

    pub fn with_ttl(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Store `snapshot` under `id`, replacing any previous entry.
    pub fn put(&self, id: &str, snapshot: Snapshot) {
        let entry = CacheEntry {
            id: id.to_string(),
            snapshot,
            timestamp: self.clock.now(),
        };
        self.entries.lock().insert(id.to_string(), entry);
        tracing::debug!("Cached weather snapshot for {}", id);
    }

    /// Fresh entry for `id`, evicting it if it has expired.
    pub fn get(&self, id: &str) -> Option<CacheEntry> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        let expired = match entries.get(id) {
            None => return None,
            Some(entry) => now - entry.timestamp >= self.ttl,
        };

        if expired {
            entries.remove(id);
            tracing::debug!("Evicted expired weather snapshot for {}", id);
            None
        } else {
            entries.get(id).cloned()
        }
    }

    /// Raw presence check that ignores expiry.
    pub fn contains_key(&self, id: &str) -> bool {
        self.entries.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl std::fmt::Debug for WeatherSnapshotCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherSnapshotCache")
            .field("entries", &self.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}
