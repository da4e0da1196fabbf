//! Condenses 3-hourly forecast samples into per-day summaries.

use chrono::{Local, NaiveDate, TimeZone, Timelike};
use std::ops::Range;

use crate::types::{Condition, DailySummary, ForecastSample};

/// Number of days shown in the condensed forecast.
pub const MAX_FORECAST_DAYS: usize = 5;

/// Local hours whose condition represents the whole day.
const MIDDAY_HOURS: Range<u32> = 12..15;

/// Aggregate samples into daily summaries using the local time zone.
pub fn aggregate_daily(samples: &[ForecastSample]) -> Vec<DailySummary> {
    aggregate_daily_in(samples, &Local)
}

/// Aggregate samples into daily summaries, reading sample hours in `tz`.
///
/// Days are keyed by the date part of `dt_txt`. At most
/// [`MAX_FORECAST_DAYS`] summaries are returned, earliest first.
pub fn aggregate_daily_in<Tz: TimeZone>(samples: &[ForecastSample], tz: &Tz) -> Vec<DailySummary> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut ordered: Vec<&ForecastSample> = samples.iter().collect();
    if !ordered.windows(2).all(|w| w[0].dt <= w[1].dt) {
        tracing::warn!(
            "Forecast samples arrived out of order ({} samples), sorting by timestamp",
            samples.len()
        );
        ordered.sort_by_key(|s| s.dt);
    }

    let mut days: Vec<DayBucket<'_>> = Vec::new();
    for sample in ordered {
        let Some(date) = sample_date(sample, tz) else {
            tracing::debug!("Skipping forecast sample with unreadable date: {}", sample.dt_txt);
            continue;
        };

        match days.iter_mut().find(|d| d.date == date) {
            Some(day) => day.samples.push(sample),
            None => days.push(DayBucket {
                date,
                samples: vec![sample],
            }),
        }
    }

    days.into_iter()
        .take(MAX_FORECAST_DAYS)
        .map(|day| day.summarize(tz))
        .collect()
}

struct DayBucket<'a> {
    date: NaiveDate,
    samples: Vec<&'a ForecastSample>,
}

impl DayBucket<'_> {
    fn summarize<Tz: TimeZone>(&self, tz: &Tz) -> DailySummary {
        let temp_min = self
            .samples
            .iter()
            .map(|s| s.main.temp)
            .fold(f64::INFINITY, f64::min);
        let temp_max = self
            .samples
            .iter()
            .map(|s| s.main.temp)
            .fold(f64::NEG_INFINITY, f64::max);
        let max_pop = self.samples.iter().map(|s| s.pop).fold(0.0, f64::max);

        let condition = self.representative_condition(tz);

        DailySummary {
            date: self.date,
            day_name: self.date.format("%a").to_string(),
            temp_min,
            temp_max,
            icon: condition.map(|c| c.icon.clone()).unwrap_or_default(),
            description: condition.map(|c| c.description.clone()).unwrap_or_default(),
            precipitation_chance: to_percent(max_pop),
        }
    }

    /// Midday condition if any sample falls in the midday slot, else the first one.
    fn representative_condition<Tz: TimeZone>(&self, tz: &Tz) -> Option<&Condition> {
        self.samples
            .iter()
            .filter(|s| local_hour(s, tz).is_some_and(|h| MIDDAY_HOURS.contains(&h)))
            .find_map(|s| s.primary_condition())
            .or_else(|| self.samples.first().and_then(|s| s.primary_condition()))
    }
}

fn sample_date<Tz: TimeZone>(sample: &ForecastSample, tz: &Tz) -> Option<NaiveDate> {
    sample
        .dt_txt
        .split(' ')
        .next()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .or_else(|| {
            tz.timestamp_opt(sample.dt, 0)
                .single()
                .map(|t| t.date_naive())
        })
}

fn local_hour<Tz: TimeZone>(sample: &ForecastSample, tz: &Tz) -> Option<u32> {
    tz.timestamp_opt(sample.dt, 0).single().map(|t| t.hour())
}

fn to_percent(probability: f64) -> u8 {
    (probability * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MainReadings;
    use chrono::{FixedOffset, NaiveDateTime, Utc};

    fn condition(id: i32, icon: &str, description: &str) -> Condition {
        Condition {
            id,
            main: "Test".into(),
            description: description.into(),
            icon: icon.into(),
        }
    }

    fn sample(dt_txt: &str, temp: f64, pop: f64, cond: Condition) -> ForecastSample {
        let dt = NaiveDateTime::parse_from_str(dt_txt, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
            .timestamp();
        ForecastSample {
            dt,
            main: MainReadings {
                temp,
                ..Default::default()
            },
            weather: vec![cond],
            pop,
            dt_txt: dt_txt.into(),
            wind: None,
            clouds: None,
        }
    }

    fn cloudy() -> Condition {
        condition(803, "04d", "broken clouds")
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_daily_in(&[], &Utc).is_empty());
    }

    #[test]
    fn test_single_day_example() {
        let samples = vec![
            sample("2024-01-01 00:00:00", 10.0, 0.1, cloudy()),
            sample("2024-01-01 03:00:00", 15.0, 0.6, cloudy()),
            sample("2024-01-01 06:00:00", 12.0, 0.2, cloudy()),
        ];

        let days = aggregate_daily_in(&samples, &Utc);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(days[0].temp_min, 10.0);
        assert_eq!(days[0].temp_max, 15.0);
        assert_eq!(days[0].precipitation_chance, 60);
        assert_eq!(days[0].day_name, "Mon");
    }

    #[test]
    fn test_single_sample_day() {
        let samples = vec![sample("2024-03-05 21:00:00", 7.5, 0.0, cloudy())];
        let days = aggregate_daily_in(&samples, &Utc);

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].temp_min, days[0].temp_max);
        assert_eq!(days[0].description, "broken clouds");
        assert_eq!(days[0].precipitation_chance, 0);
    }

    #[test]
    fn test_midday_condition_preferred() {
        let samples = vec![
            sample("2024-01-02 09:00:00", 5.0, 0.0, cloudy()),
            sample("2024-01-02 12:00:00", 8.0, 0.4, condition(500, "10d", "light rain")),
            sample("2024-01-02 15:00:00", 7.0, 0.0, condition(800, "01d", "clear sky")),
        ];

        let days = aggregate_daily_in(&samples, &Utc);
        assert_eq!(days[0].icon, "10d");
        assert_eq!(days[0].description, "light rain");
    }

    #[test]
    fn test_falls_back_to_first_condition() {
        let samples = vec![
            sample("2024-01-02 00:00:00", 5.0, 0.0, condition(600, "13n", "light snow")),
            sample("2024-01-02 03:00:00", 4.0, 0.0, cloudy()),
            sample("2024-01-02 18:00:00", 3.0, 0.0, cloudy()),
        ];

        let days = aggregate_daily_in(&samples, &Utc);
        assert_eq!(days[0].icon, "13n");
        assert_eq!(days[0].description, "light snow");
    }

    #[test]
    fn test_midday_uses_given_time_zone() {
        // 09:00 UTC is 12:00 at UTC+3.
        let samples = vec![
            sample("2024-01-02 06:00:00", 5.0, 0.0, cloudy()),
            sample("2024-01-02 09:00:00", 6.0, 0.0, condition(800, "01d", "clear sky")),
        ];
        let plus_three = FixedOffset::east_opt(3 * 3600).unwrap();

        let in_utc = aggregate_daily_in(&samples, &Utc);
        let shifted = aggregate_daily_in(&samples, &plus_three);

        assert_eq!(in_utc[0].description, "broken clouds");
        assert_eq!(shifted[0].description, "clear sky");
    }

    #[test]
    fn test_caps_at_five_days() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let samples: Vec<_> = (0..48)
            .map(|i| {
                let at = start + chrono::Duration::hours(3 * i);
                let txt = at.format("%Y-%m-%d %H:%M:%S").to_string();
                sample(&txt, i as f64, 0.0, cloudy())
            })
            .collect();

        let days = aggregate_daily_in(&samples, &Utc);
        assert_eq!(days.len(), MAX_FORECAST_DAYS);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(days[4].date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert!(days.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_out_of_order_input_is_sorted() {
        let samples = vec![
            sample("2024-01-03 12:00:00", 9.0, 0.0, cloudy()),
            sample("2024-01-01 12:00:00", 1.0, 0.0, cloudy()),
            sample("2024-01-02 12:00:00", 5.0, 0.0, cloudy()),
            sample("2024-01-01 15:00:00", 3.0, 0.0, cloudy()),
        ];

        let days = aggregate_daily_in(&samples, &Utc);
        let dates: Vec<_> = days.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(days[0].temp_min, 1.0);
        assert_eq!(days[0].temp_max, 3.0);
    }

    #[test]
    fn test_precipitation_is_clamped_percent() {
        let samples = vec![
            sample("2024-01-01 00:00:00", 1.0, 1.2, cloudy()),
            sample("2024-01-02 00:00:00", 1.0, 0.29, cloudy()),
        ];

        let days = aggregate_daily_in(&samples, &Utc);
        assert_eq!(days[0].precipitation_chance, 100);
        assert_eq!(days[1].precipitation_chance, 29);
    }

    #[test]
    fn test_min_max_within_day_bounds() {
        let temps = [3.5, -2.0, 11.25, 0.0, 7.0, -4.5, 2.0, 9.0];
        let samples: Vec<_> = temps
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let txt = format!("2024-06-10 {:02}:00:00", i * 3);
                sample(&txt, *t, 0.0, cloudy())
            })
            .collect();

        let day = &aggregate_daily_in(&samples, &Utc)[0];
        assert!(day.temp_min <= day.temp_max);
        assert_eq!(day.temp_min, -4.5);
        assert_eq!(day.temp_max, 11.25);
    }

    #[test]
    fn test_falls_back_to_timestamp_when_text_is_malformed() {
        let mut s = sample("2024-01-01 12:00:00", 4.0, 0.0, cloudy());
        s.dt_txt = "garbage".into();

        let days = aggregate_daily_in(&[s], &Utc);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }
}
