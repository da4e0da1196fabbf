use std::io::{self, Write};

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Offset, Utc};

use wxbuddy_weather::format::{
    format_humidity, format_pressure, format_temperature, format_visibility, format_wind,
};
use wxbuddy_weather::{Condition, ConditionGroup, DetailState, ViewParams, WeatherReport};

use crate::app_services::AppServices;
use crate::cli::WeatherArgs;

pub async fn cmd_weather(services: &AppServices, args: WeatherArgs, json: bool) -> Result<()> {
    let detail = services.detail_service();

    let state = match args.query {
        Some(query) => detail.open_view(&query).await,
        None => {
            let params = ViewParams {
                name: args.name,
                lat: args.lat,
                lon: args.lon,
                id: args.id,
            };
            match params.into_location() {
                Ok(location) => detail.load(location).await,
                Err(e) => DetailState::MissingLocation {
                    message: e.user_message(),
                },
            }
        }
    };

    print_state(&state, json)
}

/// Render a finished detail view.
///
/// A failed load becomes an error so the process exits non-zero.
pub fn print_state(state: &DetailState, json: bool) -> Result<()> {
    if json {
        super::print_json(state)?;
    }

    match state {
        DetailState::MissingLocation { message } => {
            if !json {
                println!("Missing City Information");
                println!("{}", message);
            }
            Ok(())
        }
        DetailState::Ready(report) => {
            if !json {
                write_report(&mut io::stdout().lock(), report)?;
            }
            Ok(())
        }
        DetailState::Failed { message, retryable } => {
            if *retryable {
                anyhow::bail!("Error Fetching Weather: {} Run the command again to retry.", message)
            }
            anyhow::bail!("Error Fetching Weather: {}", message)
        }
        DetailState::Loading | DetailState::Superseded => Ok(()),
    }
}

fn local_time(timestamp: Option<DateTime<Utc>>, offset: &FixedOffset, fmt: &str) -> String {
    timestamp
        .map(|t| t.with_timezone(offset).format(fmt).to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Provider description plus its condition group and icon, e.g. `light rain; Rain, cloud_rain`.
fn condition_label(condition: &Condition) -> String {
    let group = condition.group();
    format!(
        "{}; {}, {}",
        condition.description,
        group.description(),
        group.icon_name(condition.is_night())
    )
}

/// Write the detail view for a loaded report.
pub fn write_report(out: &mut impl Write, report: &WeatherReport) -> io::Result<()> {
    let current = &report.current;
    let offset = FixedOffset::east_opt(current.timezone).unwrap_or_else(|| Utc.fix());

    writeln!(out, "{}", report.query.page_title())?;
    writeln!(
        out,
        "{}  {}",
        report.display_name(),
        local_time(current.observed_at(), &offset, "%A, %B %-d, %Y %H:%M")
    )?;
    writeln!(out)?;

    let condition = current
        .primary_condition()
        .map(condition_label)
        .unwrap_or_else(|| ConditionGroup::Unknown.description().to_string());
    writeln!(
        out,
        "  {} ({}), feels like {}",
        format_temperature(current.main.temp),
        condition,
        format_temperature(current.main.feels_like)
    )?;
    writeln!(
        out,
        "  High {}  Low {}",
        format_temperature(current.main.temp_max),
        format_temperature(current.main.temp_min)
    )?;
    writeln!(out, "  Humidity    {}", format_humidity(current.main.humidity))?;
    writeln!(out, "  Pressure    {}", format_pressure(current.main.pressure))?;
    writeln!(out, "  Wind        {}", format_wind(&current.wind))?;
    if let Some(visibility) = current.visibility {
        writeln!(out, "  Visibility  {}", format_visibility(visibility))?;
    }
    if let Some(clouds) = &current.clouds {
        writeln!(out, "  Clouds      {}%", clouds.all)?;
    }
    if let Some(rain) = current.rain.as_ref().and_then(|r| r.one_hour) {
        writeln!(out, "  Rain (1h)   {} mm", rain)?;
    }
    if let Some(snow) = current.snow.as_ref().and_then(|s| s.one_hour) {
        writeln!(out, "  Snow (1h)   {} mm", snow)?;
    }
    writeln!(out, "  Sunrise     {}", local_time(current.sunrise(), &offset, "%H:%M"))?;
    writeln!(out, "  Sunset      {}", local_time(current.sunset(), &offset, "%H:%M"))?;
    writeln!(out, "  Backdrop    {:?}", report.backdrop())?;

    writeln!(out)?;
    writeln!(out, "5-Day Forecast")?;
    if report.daily.is_empty() {
        writeln!(out, "  No forecast data available.")?;
    }
    for day in &report.daily {
        writeln!(
            out,
            "  {:<4} {}  {:>8} / {:<8} {:>3}%  {}",
            day.day_name,
            day.date,
            format_temperature(day.temp_max),
            format_temperature(day.temp_min),
            day.precipitation_chance,
            day.description
        )?;
    }
    Ok(())
}
