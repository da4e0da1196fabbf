use std::sync::Arc;

use anyhow::Result;

use wxbuddy_weather::{resolve_current_location, FixedPositionSource, Notice, PositionSource};

use crate::app_services::AppServices;
use crate::cli::LocateArgs;

pub async fn cmd_locate(services: &AppServices, args: LocateArgs, json: bool) -> Result<()> {
    let override_source: Option<Arc<dyn PositionSource>> = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Some(Arc::new(FixedPositionSource::new(
            lat,
            lon,
            services.clock(),
        ))),
        _ => None,
    };

    let geolocator = services.geolocator(override_source);
    let weather = services.weather();

    match resolve_current_location(&geolocator, weather.as_ref()).await {
        Ok(location) => {
            tracing::info!("Resolved current location to {} ({})", location.name, location.id);
            let state = services.detail_service().load(location).await;
            super::print_state(&state, json)
        }
        Err(e) => {
            tracing::warn!("Could not resolve current location: {}", e);
            let notice = Notice::from_error(&e);
            if json {
                super::print_json(&serde_json::json!({ "notice": notice }))
            } else {
                eprintln!("{}: {}", notice.title, notice.description);
                Ok(())
            }
        }
    }
}
