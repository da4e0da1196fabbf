use serde::{Deserialize, Serialize};

use wxbuddy_weather::LocationQuery;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// One row of the city directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub geoname_id: String,
    pub name: String,
    #[serde(default)]
    pub ascii_name: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    /// Country name in English
    #[serde(default)]
    pub cou_name_en: Option<String>,
    #[serde(default)]
    pub population: Option<u64>,
    #[serde(default)]
    pub timezone: Option<String>,
    pub coordinates: Coordinates,
}

impl City {
    /// Detail view address for this city.
    pub fn location_query(&self) -> LocationQuery {
        LocationQuery {
            name: self.name.clone(),
            lat: self.coordinates.lat,
            lon: self.coordinates.lon,
            id: self.geoname_id.clone(),
        }
    }

    /// Population with thousands separators, or "N/A".
    pub fn population_display(&self) -> String {
        match self.population {
            Some(p) if p > 0 => group_thousands(p),
            _ => "N/A".to_string(),
        }
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// One page of directory results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityPage {
    /// Matching rows across all pages
    pub total_count: u64,
    #[serde(default)]
    pub results: Vec<City>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    Country,
    Population,
    Timezone,
}

impl SortKey {
    /// Field name in the directory API.
    pub fn api_field(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Country => "cou_name_en",
            Self::Population => "population",
            Self::Timezone => "timezone",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "City Name",
            Self::Country => "Country",
            Self::Population => "Population",
            Self::Timezone => "Timezone",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_api(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Clicking the current ascending column flips it; anything else sorts
    /// ascending on `key`.
    pub fn toggle(self, key: SortKey) -> Self {
        let direction = if self.key == key && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        Self { key, direction }
    }

    /// `order_by` value, e.g. `population DESC`.
    pub fn order_by(&self) -> String {
        format!("{} {}", self.key.api_field(), self.direction.as_api())
    }
}

/// A request for one page of a particular query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Query generation this request belongs to
    pub generation: u64,
    /// Zero-based page index
    pub page: u32,
    pub page_size: u32,
    pub search: String,
    pub sort: SortConfig,
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size)
    }

    /// `where` filter matching the term against city or country name.
    pub fn where_clause(&self) -> Option<String> {
        let term = self.search.trim();
        if term.is_empty() {
            return None;
        }
        let escaped = term.replace('\\', "\\\\").replace('"', "\\\"");
        Some(format!(
            "search(name, \"{escaped}\") OR search(cou_name_en, \"{escaped}\")"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(page: u32, search: &str) -> PageRequest {
        PageRequest {
            generation: 1,
            page,
            page_size: 20,
            search: search.into(),
            sort: SortConfig::default(),
        }
    }

    #[test]
    fn test_toggle_sort() {
        let sort = SortConfig::default();
        assert_eq!(sort, SortConfig::new(SortKey::Name, SortDirection::Asc));

        let sort = sort.toggle(SortKey::Name);
        assert_eq!(sort.direction, SortDirection::Desc);

        let sort = sort.toggle(SortKey::Name);
        assert_eq!(sort.direction, SortDirection::Asc);

        let sort = sort.toggle(SortKey::Name).toggle(SortKey::Population);
        assert_eq!(sort, SortConfig::new(SortKey::Population, SortDirection::Asc));
        assert_eq!(sort.order_by(), "population ASC");
    }

    #[test]
    fn test_offset() {
        assert_eq!(request(0, "").offset(), 0);
        assert_eq!(request(3, "").offset(), 60);
    }

    #[test]
    fn test_where_clause() {
        assert_eq!(request(0, "  ").where_clause(), None);
        assert_eq!(
            request(0, "Paris").where_clause().unwrap(),
            r#"search(name, "Paris") OR search(cou_name_en, "Paris")"#
        );
        assert_eq!(
            request(0, r#"O"Neil"#).where_clause().unwrap(),
            r#"search(name, "O\"Neil") OR search(cou_name_en, "O\"Neil")"#
        );
    }

    #[test]
    fn test_city_deserialize() {
        let json = serde_json::json!({
            "geoname_id": "2988507",
            "name": "Paris",
            "ascii_name": "Paris",
            "alternate_names": ["Lutetia"],
            "feature_class": "P",
            "country_code": "FR",
            "cou_name_en": "France",
            "population": 2138551,
            "elevation": null,
            "timezone": "Europe/Paris",
            "coordinates": {"lon": 2.3488, "lat": 48.85341}
        });

        let city: City = serde_json::from_value(json).unwrap();
        assert_eq!(city.population_display(), "2,138,551");
        assert_eq!(city.location_query().id, "2988507");
        assert_eq!(city.location_query().lat, 48.85341);
    }

    #[test]
    fn test_population_display() {
        let mut city: City = serde_json::from_value(serde_json::json!({
            "geoname_id": "1", "name": "X", "coordinates": {"lon": 0.0, "lat": 0.0}
        }))
        .unwrap();
        assert_eq!(city.population_display(), "N/A");

        city.population = Some(999);
        assert_eq!(city.population_display(), "999");
        city.population = Some(1000);
        assert_eq!(city.population_display(), "1,000");
    }
}
