//! Display formatting for weather readings (metric units).

use crate::types::Wind;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

pub fn format_temperature(temp: f64) -> String {
    format!("{:.1}°C", temp)
}

pub fn format_wind_speed(speed: f64) -> String {
    format!("{:.1} m/s", speed)
}

pub fn format_pressure(pressure: f64) -> String {
    format!("{} hPa", pressure)
}

pub fn format_humidity(humidity: u8) -> String {
    format!("{}%", humidity)
}

/// Visibility given in metres, shown in kilometres.
pub fn format_visibility(metres: u32) -> String {
    format!("{:.1} km", f64::from(metres) / 1000.0)
}

/// 16-point compass label for a bearing in degrees.
pub fn wind_direction(deg: f64) -> &'static str {
    let index = (deg.rem_euclid(360.0) / 22.5).round() as usize % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}

/// Speed plus compass direction; calm readings (bearing 0) omit the direction.
pub fn format_wind(wind: &Wind) -> String {
    if wind.deg == 0.0 {
        format_wind_speed(wind.speed)
    } else {
        format!("{} {}", format_wind_speed(wind.speed), wind_direction(wind.deg))
    }
}
