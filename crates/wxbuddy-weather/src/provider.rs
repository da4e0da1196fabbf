//! OpenWeatherMap client for current conditions and the 3-hourly forecast.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::instrument;

use wxbuddy_core::config::WeatherConfig;

use crate::error::WeatherError;
use crate::types::{CurrentConditions, ForecastResponse};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Readings are always requested in metric units.
const UNITS: &str = "metric";

/// Anything that can answer current-conditions and forecast lookups.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// # Errors
    /// Returns an error on transport failure or a non-success response.
    async fn current(&self, lat: f64, lon: f64) -> Result<CurrentConditions, WeatherError>;

    /// # Errors
    /// Returns an error on transport failure or a non-success response.
    async fn forecast(&self, lat: f64, lon: f64) -> Result<ForecastResponse, WeatherError>;
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, WeatherError> {
        Self::with_options(base_url, api_key, DEFAULT_TIMEOUT_SECS)
    }

    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let api_key = config.resolved_api_key().unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("No OpenWeatherMap API key configured");
        }
        Self::with_options(&config.api_base_url, &api_key, config.request_timeout_secs)
    }

    fn with_options(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        lat: f64,
        lon: f64,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let lat = lat.to_string();
        let lon = lon.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", UNITS),
            ])
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, WeatherError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))
        } else {
            let text = response.text().await.unwrap_or_default();
            // The provider reports failures as {"cod": .., "message": ".."}.
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    #[instrument(skip(self), level = "info")]
    async fn current(&self, lat: f64, lon: f64) -> Result<CurrentConditions, WeatherError> {
        self.get_json("weather", lat, lon).await
    }

    #[instrument(skip(self), level = "info")]
    async fn forecast(&self, lat: f64, lon: f64) -> Result<ForecastResponse, WeatherError> {
        self.get_json("forecast", lat, lon).await
    }
}
