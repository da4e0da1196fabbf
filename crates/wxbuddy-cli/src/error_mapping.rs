//! Maps command errors to wxbuddy_core::AppError for consistent user-facing messages.

use wxbuddy_core::AppError;
use wxbuddy_directory::DirectoryError;
use wxbuddy_weather::{GeolocationError, WeatherError};

/// Classify an error bubbling out of a command.
pub fn into_app_error(err: anyhow::Error) -> AppError {
    let err = match err.downcast::<WeatherError>() {
        Ok(e) => return e.into(),
        Err(err) => err,
    };
    let err = match err.downcast::<DirectoryError>() {
        Ok(e) => return e.into(),
        Err(err) => err,
    };
    let err = match err.downcast::<GeolocationError>() {
        Ok(e) => return WeatherError::from(e).into(),
        Err(err) => err,
    };
    match err.downcast::<std::io::Error>() {
        Ok(e) => AppError::Io(e),
        Err(err) => AppError::Other(err),
    }
}

/// Text shown to the user for a failed command.
pub fn describe(err: &AppError) -> String {
    match err {
        AppError::Other(inner) => format!("{:#}", inner),
        other => other.user_message().to_string(),
    }
}
