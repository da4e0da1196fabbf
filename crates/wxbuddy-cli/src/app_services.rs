//! Application service container.
//!
//! Builds every shared service once from [`Config`] and hands them out as
//! `Arc`s, so each command receives its collaborators explicitly.

use std::sync::Arc;

use anyhow::{Context, Result};

use wxbuddy_core::{Clock, Config, SystemClock};
use wxbuddy_directory::{CityDirectoryClient, CitySource, DirectoryBrowser};
use wxbuddy_weather::{
    DetailService, FixedPositionSource, Geolocator, JsonFileStore, LocationHistory,
    OpenWeatherClient, PositionOptions, PositionSource, UnavailablePositionSource,
    WeatherSnapshotCache, WeatherSource,
};

pub struct AppServices {
    config: Config,
    clock: Arc<dyn Clock>,
    snapshots: Arc<WeatherSnapshotCache>,
    history: Arc<LocationHistory>,
    weather: Arc<dyn WeatherSource>,
    directory: Arc<dyn CitySource>,
    position_source: Arc<dyn PositionSource>,
}

impl AppServices {
    /// Wire up services against the real providers.
    ///
    /// # Errors
    /// Returns an error if an HTTP client cannot be built.
    pub fn from_config(config: Config) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let weather = OpenWeatherClient::from_config(&config.weather)
            .context("Failed to create weather client")?;
        let directory = CityDirectoryClient::from_config(&config.directory)
            .context("Failed to create city directory client")?;

        let position_source: Arc<dyn PositionSource> = match config.geolocation.fixed_position() {
            Some((lat, lon)) => Arc::new(FixedPositionSource::new(lat, lon, clock.clone())),
            None => Arc::new(UnavailablePositionSource),
        };

        Ok(Self::new(
            config,
            clock,
            Arc::new(weather),
            Arc::new(directory),
            position_source,
        ))
    }

    /// Wire up services around the given providers.
    pub fn new(
        config: Config,
        clock: Arc<dyn Clock>,
        weather: Arc<dyn WeatherSource>,
        directory: Arc<dyn CitySource>,
        position_source: Arc<dyn PositionSource>,
    ) -> Self {
        let store = Arc::new(JsonFileStore::new(&config.storage.data_dir));
        let history = Arc::new(LocationHistory::load(store, clock.clone()));
        let snapshots = Arc::new(WeatherSnapshotCache::new(clock.clone()));

        tracing::debug!(
            "Services ready (data dir {})",
            config.storage.data_dir.display()
        );

        Self {
            config,
            clock,
            snapshots,
            history,
            weather,
            directory,
            position_source,
        }
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn snapshots(&self) -> Arc<WeatherSnapshotCache> {
        self.snapshots.clone()
    }

    pub fn history(&self) -> Arc<LocationHistory> {
        self.history.clone()
    }

    pub fn weather(&self) -> Arc<dyn WeatherSource> {
        self.weather.clone()
    }

    pub fn directory(&self) -> Arc<dyn CitySource> {
        self.directory.clone()
    }

    pub fn detail_service(&self) -> DetailService {
        DetailService::new(self.weather(), self.snapshots(), self.history())
    }

    pub fn directory_browser(&self) -> DirectoryBrowser {
        DirectoryBrowser::new(&self.config.directory, self.clock())
    }

    /// Geolocator over the configured source, or over `override_source`.
    pub fn geolocator(&self, override_source: Option<Arc<dyn PositionSource>>) -> Geolocator {
        let source = override_source.unwrap_or_else(|| self.position_source.clone());
        Geolocator::new(
            source,
            PositionOptions::from(&self.config.geolocation),
            self.clock(),
        )
    }
}

impl std::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppServices")
            .field("data_dir", &self.config.storage.data_dir)
            .field("history", &self.history)
            .field("snapshots", &self.snapshots)
            .finish()
    }
}
