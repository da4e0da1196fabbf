use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Weather condition categories mapped from provider condition codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConditionGroup {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Atmosphere,
    Clear,
    FewClouds,
    Clouds,
    #[default]
    Unknown,
}

impl ConditionGroup {
    /// Convert an OpenWeatherMap condition code to a group
    /// See: https://openweathermap.org/weather-conditions
    pub fn from_code(code: i32) -> Self {
        match code {
            200..=299 => Self::Thunderstorm,
            300..=399 => Self::Drizzle,
            500..=599 => Self::Rain,
            600..=699 => Self::Snow,
            700..=799 => Self::Atmosphere,
            800 => Self::Clear,
            801 => Self::FewClouds,
            802..=804 => Self::Clouds,
            _ => Self::Unknown,
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "Thunderstorm",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Atmosphere => "Mist",
            Self::Clear => "Clear",
            Self::FewClouds => "Few Clouds",
            Self::Clouds => "Cloudy",
            Self::Unknown => "Unknown",
        }
    }

    /// Icon name for the group; clear and few-clouds skies have night variants.
    pub fn icon_name(&self, is_night: bool) -> &'static str {
        match self {
            Self::Thunderstorm => "cloud_lightning",
            Self::Drizzle => "cloud_drizzle",
            Self::Rain => "cloud_rain",
            Self::Snow => "cloud_snow",
            Self::Atmosphere => "cloud_fog",
            Self::Clear if is_night => "cloud_moon",
            Self::Clear => "sun",
            Self::FewClouds if is_night => "cloud_moon",
            Self::FewClouds => "cloud_sun",
            Self::Clouds => "cloud",
            Self::Unknown if is_night => "cloud_moon",
            Self::Unknown => "cloud_sun",
        }
    }
}

/// Backdrop theme picked from a condition's category name ("Rain", "Clouds", ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Backdrop {
    Clear,
    Clouds,
    Rain,
    Snow,
    Thunderstorm,
    Mist,
    #[default]
    Default,
}

impl Backdrop {
    pub fn from_main(main: Option<&str>) -> Self {
        let Some(main) = main else {
            return Self::Default;
        };
        match main.to_lowercase().as_str() {
            "clear" => Self::Clear,
            "clouds" => Self::Clouds,
            "rain" | "drizzle" => Self::Rain,
            "snow" => Self::Snow,
            "thunderstorm" => Self::Thunderstorm,
            "mist" | "smoke" | "haze" | "dust" | "fog" | "sand" | "ash" | "squall"
            | "tornado" => Self::Mist,
            _ => Self::Default,
        }
    }
}

/// One provider weather condition (`weather[]` element)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Condition {
    pub id: i32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

impl Condition {
    pub fn group(&self) -> ConditionGroup {
        ConditionGroup::from_code(self.id)
    }

    /// Provider icon tokens end in `n` for night-time conditions.
    pub fn is_night(&self) -> bool {
        self.icon.contains('n')
    }
}

/// Temperature/pressure/humidity block shared by current and forecast data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MainReadings {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub temp_min: f64,
    #[serde(default)]
    pub temp_max: f64,
    #[serde(default)]
    pub pressure: f64,
    #[serde(default)]
    pub humidity: u8,
    #[serde(default)]
    pub sea_level: Option<f64>,
    #[serde(default)]
    pub grnd_level: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Wind {
    pub speed: f64,
    #[serde(default)]
    pub deg: f64,
    #[serde(default)]
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Clouds {
    #[serde(default)]
    pub all: f64,
}

/// Rain or snow volume in millimetres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Precipitation {
    #[serde(rename = "1h", default)]
    pub one_hour: Option<f64>,
    #[serde(rename = "3h", default)]
    pub three_hours: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SunInfo {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sunrise: i64,
    #[serde(default)]
    pub sunset: i64,
}

/// Current conditions response (`/weather`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(default)]
    pub coord: Option<Coord>,
    #[serde(default)]
    pub weather: Vec<Condition>,
    pub main: MainReadings,
    /// Metres
    #[serde(default)]
    pub visibility: Option<u32>,
    #[serde(default)]
    pub wind: Wind,
    #[serde(default)]
    pub clouds: Option<Clouds>,
    #[serde(default)]
    pub rain: Option<Precipitation>,
    #[serde(default)]
    pub snow: Option<Precipitation>,
    #[serde(default)]
    pub dt: i64,
    #[serde(default)]
    pub sys: SunInfo,
    /// Shift in seconds from UTC
    #[serde(default)]
    pub timezone: i32,
    /// Provider-assigned city id (0 when unknown)
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

impl CurrentConditions {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.weather.first()
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.dt, 0)
    }

    pub fn sunrise(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.sys.sunrise, 0)
    }

    pub fn sunset(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.sys.sunset, 0)
    }

    pub fn backdrop(&self) -> Backdrop {
        Backdrop::from_main(self.primary_condition().map(|c| c.main.as_str()))
    }
}

/// One time slice of the forecast (`/forecast` `list[]` element)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Epoch seconds
    pub dt: i64,
    pub main: MainReadings,
    #[serde(default)]
    pub weather: Vec<Condition>,
    /// Probability of precipitation in [0, 1]
    #[serde(default)]
    pub pop: f64,
    /// "YYYY-MM-DD HH:MM:SS"
    pub dt_txt: String,
    #[serde(default)]
    pub wind: Option<Wind>,
    #[serde(default)]
    pub clouds: Option<Clouds>,
}

impl ForecastSample {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.weather.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ForecastCity {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub coord: Option<Coord>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub timezone: i32,
}

/// Forecast response (`/forecast`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub cnt: u32,
    pub list: Vec<ForecastSample>,
    #[serde(default)]
    pub city: Option<ForecastCity>,
}

/// One day of the condensed forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub day_name: String,
    pub temp_min: f64,
    pub temp_max: f64,
    pub icon: String,
    pub description: String,
    /// Percent in [0, 100]
    pub precipitation_chance: u8,
}

/// Short weather preview shown next to a city row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Snapshot {
    pub temp: Option<f64>,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

impl From<&CurrentConditions> for Snapshot {
    fn from(current: &CurrentConditions) -> Self {
        let condition = current.primary_condition();
        Self {
            temp: Some(current.main.temp),
            temp_max: Some(current.main.temp_max),
            temp_min: Some(current.main.temp_min),
            description: condition.map(|c| c.description.clone()),
            icon: condition.map(|c| c.icon.clone()),
        }
    }
}

/// Address of a detail view: where to look and what to call it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationQuery {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Geoname id or provider city id
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_code_groups() {
        assert_eq!(ConditionGroup::from_code(211), ConditionGroup::Thunderstorm);
        assert_eq!(ConditionGroup::from_code(301), ConditionGroup::Drizzle);
        assert_eq!(ConditionGroup::from_code(500), ConditionGroup::Rain);
        assert_eq!(ConditionGroup::from_code(601), ConditionGroup::Snow);
        assert_eq!(ConditionGroup::from_code(741), ConditionGroup::Atmosphere);
        assert_eq!(ConditionGroup::from_code(800), ConditionGroup::Clear);
        assert_eq!(ConditionGroup::from_code(801), ConditionGroup::FewClouds);
        assert_eq!(ConditionGroup::from_code(804), ConditionGroup::Clouds);
    }

    #[test]
    fn test_unknown_codes() {
        assert_eq!(ConditionGroup::from_code(0), ConditionGroup::Unknown);
        assert_eq!(ConditionGroup::from_code(450), ConditionGroup::Unknown);
        assert_eq!(ConditionGroup::from_code(805), ConditionGroup::Unknown);
    }

    #[test]
    fn test_icon_name_night_variants() {
        assert_eq!(ConditionGroup::Clear.icon_name(false), "sun");
        assert_eq!(ConditionGroup::Clear.icon_name(true), "cloud_moon");
        assert_eq!(ConditionGroup::Rain.icon_name(true), "cloud_rain");
    }

    #[test]
    fn test_condition_is_night() {
        let c = Condition {
            id: 800,
            main: "Clear".into(),
            description: "clear sky".into(),
            icon: "01n".into(),
        };
        assert!(c.is_night());
        assert_eq!(c.group(), ConditionGroup::Clear);
    }

    #[test]
    fn test_backdrop_from_main() {
        assert_eq!(Backdrop::from_main(Some("Drizzle")), Backdrop::Rain);
        assert_eq!(Backdrop::from_main(Some("Haze")), Backdrop::Mist);
        assert_eq!(Backdrop::from_main(Some("Clouds")), Backdrop::Clouds);
        assert_eq!(Backdrop::from_main(Some("Volcano")), Backdrop::Default);
        assert_eq!(Backdrop::from_main(None), Backdrop::Default);
    }

    #[test]
    fn test_current_conditions_deserialize() {
        let json = serde_json::json!({
            "coord": {"lon": -0.1257, "lat": 51.5085},
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
            "base": "stations",
            "main": {
                "temp": 11.2, "feels_like": 10.5, "temp_min": 9.8, "temp_max": 12.4,
                "pressure": 1012, "humidity": 81, "sea_level": 1012, "grnd_level": 1008
            },
            "visibility": 10000,
            "wind": {"speed": 4.1, "deg": 240, "gust": 7.2},
            "clouds": {"all": 75},
            "rain": {"1h": 0.35},
            "dt": 1704110400,
            "sys": {"type": 2, "id": 2075535, "country": "GB", "sunrise": 1704096300, "sunset": 1704124800},
            "timezone": 0,
            "id": 2643743,
            "name": "London",
            "cod": 200
        });

        let current: CurrentConditions = serde_json::from_value(json).unwrap();
        assert_eq!(current.id, 2643743);
        assert_eq!(current.name, "London");
        assert_eq!(current.main.humidity, 81);
        assert_eq!(current.wind.gust, Some(7.2));
        assert_eq!(current.rain.as_ref().and_then(|r| r.one_hour), Some(0.35));
        assert_eq!(current.backdrop(), Backdrop::Rain);

        let snapshot = Snapshot::from(&current);
        assert_eq!(snapshot.temp, Some(11.2));
        assert_eq!(snapshot.icon.as_deref(), Some("10d"));
    }
}
