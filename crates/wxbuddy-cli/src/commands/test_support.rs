//! Shared fixtures for command tests.

use std::path::Path;

use wiremock::MockServer;
use wxbuddy_core::Config;

use crate::app_services::AppServices;

/// Services wired to mock directory and weather servers.
pub fn services_for(directory: &MockServer, weather: &MockServer, data_dir: &Path) -> AppServices {
    let mut config = Config::default();
    config.directory.base_url = directory.uri();
    config.weather.api_base_url = weather.uri();
    config.weather.api_key = Some("test-key".into());
    config.storage.data_dir = data_dir.to_path_buf();
    AppServices::from_config(config).unwrap()
}

/// Directory page of towns named `Town {i}` with geoname id `1000 + i`.
pub fn city_page(offset: u32, count: u32, total: u32) -> serde_json::Value {
    let results: Vec<_> = (offset..offset + count)
        .map(|i| {
            serde_json::json!({
                "geoname_id": format!("{}", 1000 + i),
                "name": format!("Town {i}"),
                "cou_name_en": "Exampleland",
                "population": 5000 + i,
                "timezone": "Europe/Berlin",
                "coordinates": {"lon": 10.0, "lat": 50.0}
            })
        })
        .collect();
    serde_json::json!({"total_count": total, "results": results})
}

pub fn current_json(temp: f64) -> serde_json::Value {
    serde_json::json!({
        "coord": {"lon": 10.0, "lat": 50.0},
        "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
        "main": {"temp": temp, "feels_like": temp - 1.0, "temp_min": temp - 2.0,
                 "temp_max": temp + 2.0, "pressure": 1012, "humidity": 70},
        "visibility": 10000,
        "wind": {"speed": 3.6, "deg": 250},
        "dt": 1704110400,
        "sys": {"country": "EX", "sunrise": 1704093000, "sunset": 1704123000},
        "timezone": 3600,
        "id": 1001,
        "name": "Town 1"
    })
}

pub fn forecast_json() -> serde_json::Value {
    serde_json::json!({
        "cnt": 2,
        "list": [
            {"dt": 1704110400, "main": {"temp": 12.0}, "pop": 0.2,
             "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
             "dt_txt": "2024-01-01 12:00:00"},
            {"dt": 1704121200, "main": {"temp": 9.0}, "pop": 0.5,
             "weather": [{"id": 804, "main": "Clouds", "description": "overcast clouds", "icon": "04d"}],
             "dt_txt": "2024-01-01 15:00:00"}
        ]
    })
}
