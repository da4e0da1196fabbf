//! Weather-specific error types.

use thiserror::Error;

/// Position lookup failure, shaped like the browser geolocation error
/// (numeric code plus message).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (code {code})")]
pub struct GeolocationError {
    pub code: u16,
    pub message: String,
}

impl GeolocationError {
    pub const NOT_SUPPORTED: u16 = 0;
    pub const PERMISSION_DENIED: u16 = 1;
    pub const POSITION_UNAVAILABLE: u16 = 2;
    pub const TIMEOUT: u16 = 3;

    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_supported() -> Self {
        Self::new(
            Self::NOT_SUPPORTED,
            "Geolocation is not supported on this system.",
        )
    }

    pub fn timeout() -> Self {
        Self::new(Self::TIMEOUT, "Timed out while waiting for a position fix.")
    }
}

/// Local persistence errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Weather provider and detail view errors.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Weather API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Location error: {0}")]
    Location(#[from] GeolocationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Missing city information: {0}")]
    MissingParams(String),
}

impl WeatherError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Network error. Check your connection.".to_string(),
            Self::Api { status: 401, .. } => {
                "Weather API key is invalid. Check settings.".to_string()
            }
            Self::Api { status: 404, .. } => "Location not found.".to_string(),
            Self::Api { status, .. } if *status >= 500 => {
                "Weather service unavailable. Please try again later.".to_string()
            }
            Self::Api { message, .. } => format!("Weather error: {}", message),
            Self::Parse(_) => "Could not load weather data for this city.".to_string(),
            Self::Location(e) => e.message.clone(),
            Self::Storage(_) => "Local storage error".to_string(),
            Self::MissingParams(_) => {
                "Latitude, longitude, or city ID is missing. Please select a city from the list."
                    .to_string()
            }
        }
    }

    /// Whether offering the user a manual retry makes sense.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429 || *status == 408,
            _ => false,
        }
    }
}

impl From<WeatherError> for wxbuddy_core::AppError {
    fn from(e: WeatherError) -> Self {
        use wxbuddy_core::error::{ReqwestErrorExt, WeatherError as CoreWeatherError};

        match e {
            WeatherError::Network(err) => Self::Network(err.into_network_error()),
            WeatherError::Api { status: 401, .. } => {
                Self::Weather(CoreWeatherError::InvalidApiKey)
            }
            WeatherError::Api { status: 404, message } => {
                Self::Weather(CoreWeatherError::LocationNotFound(message))
            }
            WeatherError::Api { status, .. } if status >= 500 => {
                Self::Weather(CoreWeatherError::ServiceUnavailable)
            }
            WeatherError::Api { message, .. } | WeatherError::Parse(message) => {
                Self::Weather(CoreWeatherError::ApiError(message))
            }
            WeatherError::Location(err) => {
                Self::Weather(CoreWeatherError::Geolocation(err.message))
            }
            WeatherError::Storage(err) => Self::Other(anyhow::Error::new(err)),
            WeatherError::MissingParams(field) => {
                Self::Weather(CoreWeatherError::MissingParams(field))
            }
        }
    }
}
