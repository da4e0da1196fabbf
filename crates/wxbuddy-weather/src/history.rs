//! Recently viewed locations, most recent first, persisted on every change.
//!
//! The list transition ([`record_transition`]) is a pure function; the
//! [`LocationHistory`] service applies it and writes the result through to a
//! [`KeyValueStore`]. Storage problems never escape: a broken or missing
//! persisted list loads as empty, and failed writes are logged while the
//! in-memory list stays authoritative for the session.

use parking_lot::Mutex;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::sync::Arc;

use wxbuddy_core::Clock;

use crate::storage::KeyValueStore;
use crate::types::LocationQuery;

/// Maximum number of remembered locations.
pub const MAX_HISTORY_ITEMS: usize = 10;

/// Storage key holding the serialized list.
pub const HISTORY_STORAGE_KEY: &str = "weatherEyeLocationHistory";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewedLocation {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Epoch milliseconds
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: i64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Accepts numbers and numeric strings.
fn lenient_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Int(v) => Ok(v),
        RawTimestamp::Float(v) => Ok(v as i64),
        RawTimestamp::Text(s) => s
            .trim()
            .parse::<f64>()
            .map(|v| v as i64)
            .map_err(de::Error::custom),
    }
}

impl ViewedLocation {
    /// Detail view address for this entry.
    pub fn location_query(&self) -> LocationQuery {
        LocationQuery {
            name: self.name.clone(),
            lat: self.lat,
            lon: self.lon,
            id: self.id.clone(),
        }
    }
}

fn coord_key(value: f64) -> String {
    format!("{:.4}", value)
}

/// Whether `existing` refers to the same place as `location`.
///
/// Ids come from two provider schemes, so a name plus coordinates match
/// (to 4 decimals) also counts.
pub fn same_place(existing: &ViewedLocation, location: &LocationQuery) -> bool {
    existing.id == location.id
        || (existing.name == location.name
            && coord_key(existing.lat) == coord_key(location.lat)
            && coord_key(existing.lon) == coord_key(location.lon))
}

/// New list after viewing `location` at `now_ms`.
pub fn record_transition(
    current: &[ViewedLocation],
    location: &LocationQuery,
    now_ms: i64,
) -> Vec<ViewedLocation> {
    let newest = ViewedLocation {
        id: location.id.clone(),
        name: location.name.clone(),
        lat: location.lat,
        lon: location.lon,
        timestamp: now_ms,
    };

    std::iter::once(newest)
        .chain(
            current
                .iter()
                .filter(|existing| !same_place(existing, location))
                .cloned(),
        )
        .take(MAX_HISTORY_ITEMS)
        .collect()
}

/// Parse a persisted list; anything unreadable is an empty history.
pub fn parse_persisted(raw: &str) -> Vec<ViewedLocation> {
    match serde_json::from_str::<Vec<ViewedLocation>>(raw) {
        Ok(mut entries) => {
            entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            entries.truncate(MAX_HISTORY_ITEMS);
            entries
        }
        Err(e) => {
            tracing::warn!("Failed to parse location history, starting empty: {}", e);
            Vec::new()
        }
    }
}

/// Location history service.
pub struct LocationHistory {
    entries: Mutex<Vec<ViewedLocation>>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl LocationHistory {
    /// Load the persisted list, falling back to empty.
    pub fn load(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let entries = match store.get(HISTORY_STORAGE_KEY) {
            Ok(Some(raw)) => parse_persisted(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to load location history: {}", e);
                Vec::new()
            }
        };
        tracing::debug!("Loaded {} viewed locations", entries.len());

        Self {
            entries: Mutex::new(entries),
            store,
            clock,
        }
    }

    /// Move `location` to the front of the history.
    pub fn record(&self, location: &LocationQuery) {
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock();
        *entries = record_transition(&entries, location, now);
        self.persist(&entries);
    }

    /// Forget every location.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.clear();
        self.persist(&entries);
    }

    /// Snapshot of the list, most recent first.
    pub fn entries(&self) -> Vec<ViewedLocation> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn persist(&self, entries: &[ViewedLocation]) {
        let result = serde_json::to_string(entries)
            .map_err(Into::into)
            .and_then(|json| self.store.set(HISTORY_STORAGE_KEY, &json));

        if let Err(e) = result {
            tracing::warn!("Failed to save location history: {}", e);
        }
    }
}

impl std::fmt::Debug for LocationHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationHistory")
            .field("entries", &self.len())
            .finish()
    }
}
