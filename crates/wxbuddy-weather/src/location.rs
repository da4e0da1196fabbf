//! One-shot position lookup and "weather at my location" resolution.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use wxbuddy_core::config::GeolocationConfig;
use wxbuddy_core::Clock;

use crate::error::{GeolocationError, WeatherError};
use crate::provider::WeatherSource;
use crate::types::LocationQuery;

/// Options for a position request.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    /// Give up after this long
    pub timeout: Duration,
    /// Accept a previous fix up to this old
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: false,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(5 * 60),
        }
    }
}

impl From<&GeolocationConfig> for PositionOptions {
    fn from(config: &GeolocationConfig) -> Self {
        Self {
            enable_high_accuracy: config.enable_high_accuracy,
            timeout: Duration::from_secs(config.timeout_secs),
            maximum_age: Duration::from_secs(config.maximum_age_secs),
        }
    }
}

/// A position fix.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres
    pub accuracy: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

#[async_trait]
pub trait PositionSource: Send + Sync {
    /// # Errors
    /// Returns a [`GeolocationError`] when no fix can be obtained.
    async fn current_position(&self, options: &PositionOptions)
        -> Result<Position, GeolocationError>;
}

/// Reports a configured position.
pub struct FixedPositionSource {
    latitude: f64,
    longitude: f64,
    clock: Arc<dyn Clock>,
}

impl FixedPositionSource {
    pub fn new(latitude: f64, longitude: f64, clock: Arc<dyn Clock>) -> Self {
        Self {
            latitude,
            longitude,
            clock,
        }
    }
}

#[async_trait]
impl PositionSource for FixedPositionSource {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Position, GeolocationError> {
        Ok(Position {
            latitude: self.latitude,
            longitude: self.longitude,
            accuracy: None,
            timestamp: self.clock.now(),
        })
    }
}

/// Used when no position source is configured.
#[derive(Debug, Default)]
pub struct UnavailablePositionSource;

#[async_trait]
impl PositionSource for UnavailablePositionSource {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Position, GeolocationError> {
        Err(GeolocationError::not_supported())
    }
}

/// Applies timeout and maximum-age handling on top of a [`PositionSource`].
pub struct Geolocator {
    source: Arc<dyn PositionSource>,
    options: PositionOptions,
    clock: Arc<dyn Clock>,
    last_fix: Mutex<Option<Position>>,
}

impl Geolocator {
    pub fn new(source: Arc<dyn PositionSource>, options: PositionOptions, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            options,
            clock,
            last_fix: Mutex::new(None),
        }
    }

    /// # Errors
    /// Returns the source's error, or a timeout error when it is too slow.
    pub async fn locate(&self) -> Result<Position, GeolocationError> {
        if let Some(fix) = self.recent_fix() {
            tracing::debug!("Reusing position fix from {}", fix.timestamp);
            return Ok(fix);
        }

        let fix = tokio::time::timeout(
            self.options.timeout,
            self.source.current_position(&self.options),
        )
        .await
        .map_err(|_| GeolocationError::timeout())??;

        *self.last_fix.lock() = Some(fix.clone());
        Ok(fix)
    }

    fn recent_fix(&self) -> Option<Position> {
        let fix = self.last_fix.lock().clone()?;
        let max_age = chrono::Duration::from_std(self.options.maximum_age).ok()?;
        (self.clock.now() - fix.timestamp < max_age).then_some(fix)
    }
}

/// Transient user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn from_error(error: &WeatherError) -> Self {
        let title = match error {
            WeatherError::Location(_) => "Geolocation Error",
            _ => "Weather Lookup Failed",
        };
        Self {
            title: title.to_string(),
            description: error.user_message(),
        }
    }
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Find the provider city at the current position.
///
/// # Errors
/// Returns a location error when no fix is available, the provider's error
/// when the lookup fails, or a parse error when the provider does not name
/// the place.
pub async fn resolve_current_location(
    geolocator: &Geolocator,
    weather: &dyn WeatherSource,
) -> Result<LocationQuery, WeatherError> {
    let position = geolocator.locate().await?;
    tracing::info!("Got location: {}, {}", position.latitude, position.longitude);

    let current = weather.current(position.latitude, position.longitude).await?;
    if current.id == 0 || current.name.is_empty() {
        return Err(WeatherError::Parse(
            "City ID or name not found in weather data.".to_string(),
        ));
    }

    Ok(LocationQuery {
        name: current.name,
        lat: round6(position.latitude),
        lon: round6(position.longitude),
        id: current.id.to_string(),
    })
}
