//! Weather data for WxBuddy
//!
//! OpenWeatherMap lookups, the condensed daily forecast, the in-session
//! snapshot cache, persisted location history, position lookup and the
//! detail view that ties them together.

pub mod detail;
pub mod error;
pub mod forecast;
pub mod format;
pub mod history;
pub mod location;
pub mod provider;
pub mod snapshot;
pub mod storage;
pub mod types;

pub use detail::{DetailService, DetailState, ViewParams, WeatherReport, DEFAULT_CITY_NAME};
pub use error::{GeolocationError, StorageError, WeatherError};
pub use forecast::{aggregate_daily, aggregate_daily_in, MAX_FORECAST_DAYS};
pub use history::{LocationHistory, ViewedLocation, HISTORY_STORAGE_KEY, MAX_HISTORY_ITEMS};
pub use location::{
    resolve_current_location, FixedPositionSource, Geolocator, Notice, Position, PositionOptions,
    PositionSource, UnavailablePositionSource,
};
pub use provider::{OpenWeatherClient, WeatherSource};
pub use snapshot::{CacheEntry, WeatherSnapshotCache, SNAPSHOT_TTL_MINUTES};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use types::*;
