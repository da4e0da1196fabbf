//! Weather detail view: parameter parsing, concurrent fetch, and view state.
//!
//! A view is addressed by `name`, `lat`, `lon` and `id` query parameters.
//! Loading fetches current conditions and the forecast together; only a
//! complete success updates the snapshot cache and the location history.
//! When loads overlap, the most recently started one owns the view and older
//! results are discarded.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::WeatherError;
use crate::forecast::aggregate_daily;
use crate::history::LocationHistory;
use crate::provider::WeatherSource;
use crate::snapshot::WeatherSnapshotCache;
use crate::types::{Backdrop, CurrentConditions, DailySummary, LocationQuery, Snapshot};

/// Name shown when the query carries no `name`.
pub const DEFAULT_CITY_NAME: &str = "Selected City";

/// Raw detail view parameters as they appear in a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewParams {
    pub name: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub id: Option<String>,
}

impl ViewParams {
    /// Collect parameters from `name=..&lat=..&lon=..&id=..`; a leading `?` is ignored.
    pub fn parse(query: &str) -> Self {
        let mut params = Self::default();
        let query = query.trim_start_matches('?');

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim().to_string();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "name" => params.name = Some(value),
                "lat" => params.lat = Some(value),
                "lon" => params.lon = Some(value),
                "id" => params.id = Some(value),
                _ => {}
            }
        }
        params
    }

    /// Parse and validate a query string into a [`LocationQuery`].
    ///
    /// # Errors
    /// Returns [`WeatherError::MissingParams`] when `lat`, `lon` or `id` is
    /// absent or a coordinate is not a finite number.
    pub fn from_query(query: &str) -> Result<LocationQuery, WeatherError> {
        Self::parse(query).into_location()
    }

    /// # Errors
    /// See [`ViewParams::from_query`].
    pub fn into_location(self) -> Result<LocationQuery, WeatherError> {
        let lat = parse_coordinate("lat", self.lat.as_deref())?;
        let lon = parse_coordinate("lon", self.lon.as_deref())?;
        let id = self
            .id
            .ok_or_else(|| WeatherError::MissingParams("id".to_string()))?;

        Ok(LocationQuery {
            name: self.name.unwrap_or_else(|| DEFAULT_CITY_NAME.to_string()),
            lat,
            lon,
            id,
        })
    }
}

fn parse_coordinate(field: &str, raw: Option<&str>) -> Result<f64, WeatherError> {
    raw.and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| WeatherError::MissingParams(field.to_string()))
}

impl LocationQuery {
    /// Query string addressing this location's detail view.
    pub fn to_query(&self) -> String {
        format!(
            "name={}&lat={}&lon={}&id={}",
            urlencoding::encode(&self.name),
            self.lat,
            self.lon,
            urlencoding::encode(&self.id)
        )
    }

    /// Heading for the detail view.
    pub fn page_title(&self) -> String {
        format!("{} Forecast - WeatherBuddy", self.name)
    }
}

/// Everything a loaded detail view shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub query: LocationQuery,
    pub current: CurrentConditions,
    pub daily: Vec<DailySummary>,
}

impl WeatherReport {
    /// Provider's place name, falling back to the requested one.
    pub fn display_name(&self) -> &str {
        if self.current.name.is_empty() {
            &self.query.name
        } else {
            &self.current.name
        }
    }

    pub fn backdrop(&self) -> Backdrop {
        self.current.backdrop()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DetailState {
    MissingLocation { message: String },
    Loading,
    Ready(WeatherReport),
    Failed { message: String, retryable: bool },
    /// A newer load started before this one finished.
    Superseded,
}

impl DetailState {
    fn failed(error: &WeatherError) -> Self {
        Self::Failed {
            message: error.user_message(),
            retryable: error.is_retryable(),
        }
    }
}

/// Drives the detail view for one session.
pub struct DetailService {
    source: Arc<dyn WeatherSource>,
    snapshots: Arc<WeatherSnapshotCache>,
    history: Arc<LocationHistory>,
    generation: AtomicU64,
    state: Mutex<DetailState>,
    last_query: Mutex<Option<LocationQuery>>,
}

impl DetailService {
    pub fn new(
        source: Arc<dyn WeatherSource>,
        snapshots: Arc<WeatherSnapshotCache>,
        history: Arc<LocationHistory>,
    ) -> Self {
        Self {
            source,
            snapshots,
            history,
            generation: AtomicU64::new(0),
            state: Mutex::new(DetailState::Loading),
            last_query: Mutex::new(None),
        }
    }

    /// Parse `query` and load it, or report the missing parameters.
    pub async fn open_view(&self, query: &str) -> DetailState {
        match ViewParams::from_query(query) {
            Ok(location) => self.load(location).await,
            Err(e) => {
                tracing::warn!("Cannot open weather view: {}", e);
                self.next_ticket();
                *self.last_query.lock() = None;
                let state = DetailState::MissingLocation {
                    message: e.user_message(),
                };
                *self.state.lock() = state.clone();
                state
            }
        }
    }

    /// Fetch and publish weather for `query`.
    pub async fn load(&self, query: LocationQuery) -> DetailState {
        let ticket = self.next_ticket();
        *self.last_query.lock() = Some(query.clone());
        *self.state.lock() = DetailState::Loading;
        tracing::info!("Loading weather for {} ({})", query.name, query.id);

        let result = tokio::try_join!(
            self.source.current(query.lat, query.lon),
            self.source.forecast(query.lat, query.lon),
        );

        let mut state = self.state.lock();
        if self.generation.load(Ordering::SeqCst) != ticket {
            tracing::debug!("Discarding superseded weather load for {}", query.id);
            return DetailState::Superseded;
        }

        let next = match result {
            Ok((current, forecast)) => {
                self.snapshots.put(&query.id, Snapshot::from(&current));

                let name = if current.name.is_empty() {
                    query.name.clone()
                } else {
                    current.name.clone()
                };
                self.history.record(&LocationQuery {
                    name,
                    lat: query.lat,
                    lon: query.lon,
                    id: query.id.clone(),
                });

                let daily = aggregate_daily(&forecast.list);
                DetailState::Ready(WeatherReport {
                    query,
                    current,
                    daily,
                })
            }
            Err(e) => {
                tracing::error!("Failed to load weather for {}: {}", query.id, e);
                DetailState::failed(&e)
            }
        };

        *state = next.clone();
        next
    }

    /// Reload the last requested location.
    pub async fn retry(&self) -> DetailState {
        let last = self.last_query.lock().clone();
        match last {
            Some(query) => self.load(query).await,
            None => DetailState::MissingLocation {
                message: WeatherError::MissingParams("id".to_string()).user_message(),
            },
        }
    }

    pub fn state(&self) -> DetailState {
        self.state.lock().clone()
    }

    fn next_ticket(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}
