pub mod clock;
pub mod config;
pub mod error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    Config, DirectoryConfig, GeolocationConfig, StorageConfig, ValidationResult,
    WeatherConfig,
};
pub use error::{AppError, ConfigError, DirectoryError, NetworkError, WeatherError};

use anyhow::Result;

/// Initialize tracing for the application.
///
/// `RUST_LOG` wins over `default_level` when set.
pub fn init(default_level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::debug!("WxBuddy core initialized");
    Ok(())
}
