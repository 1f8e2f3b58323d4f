use std::{collections::HashSet, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity of a watched city.
///
/// Two keys name the same city iff both fields match exactly. No case folding
/// happens here; whatever the geocoder resolved is what gets compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CityKey {
    pub name: String,
    pub country_code: String,
}

impl CityKey {
    pub fn new(name: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self { name: name.into(), country_code: country_code.into() }
    }

    /// Wire form used in path segments: `name,country_code`.
    pub fn path_segment(&self) -> String {
        format!("{},{}", self.name, self.country_code)
    }
}

impl fmt::Display for CityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.name, self.country_code)
    }
}

/// Latitude/longitude as sent by the API: plain degrees, or already formatted
/// (e.g. `"50.09°N"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Degrees(f64),
    Formatted(String),
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordinate::Degrees(deg) => write!(f, "{deg:.2}"),
            Coordinate::Formatted(s) => f.write_str(s),
        }
    }
}

/// One entry of the watch-list, as produced by the summary endpoint.
///
/// Only the key fields are required. The mutation endpoints may answer with
/// lean entries carrying nothing but the key and coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySummary {
    pub name: String,
    pub country_code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,

    /// Short condition group, e.g. "Clouds".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Icon URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default)]
    pub is_day: bool,

    /// Local time at the city, `HH:MM dd.mm.YYYY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunrise_readable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunset_readable: Option<String>,

    /// Observation time, unix seconds.
    #[serde(default, rename = "dt", skip_serializing_if = "Option::is_none")]
    pub observed_ts: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<Coordinate>,
}

impl CitySummary {
    /// Bare entry with only the identity fields set.
    pub fn new(key: CityKey) -> Self {
        Self {
            name: key.name,
            country_code: key.country_code,
            temperature: None,
            feels_like: None,
            humidity: None,
            wind_speed: None,
            main: None,
            description: None,
            icon: None,
            is_day: false,
            current_time: None,
            sunrise_readable: None,
            sunset_readable: None,
            observed_ts: None,
            lat: None,
            lon: None,
        }
    }

    pub fn key(&self) -> CityKey {
        CityKey::new(self.name.clone(), self.country_code.clone())
    }

    pub fn has_key(&self, key: &CityKey) -> bool {
        self.name == key.name && self.country_code == key.country_code
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.observed_ts.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("city '{0}' appears more than once in the list")]
pub struct DuplicateCity(pub CityKey);

/// Server-ordered list of watched cities with no two entries sharing a key.
///
/// The only way to build one is through [`WatchList::new`] (or deserializing,
/// which goes through the same check), so a list holding duplicates cannot
/// exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CitySummary>", into = "Vec<CitySummary>")]
pub struct WatchList(Vec<CitySummary>);

impl WatchList {
    pub fn new(entries: Vec<CitySummary>) -> Result<Self, DuplicateCity> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert((entry.name.as_str(), entry.country_code.as_str())) {
                return Err(DuplicateCity(entry.key()));
            }
        }
        Ok(Self(entries))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CitySummary> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[CitySummary] {
        &self.0
    }

    pub fn contains(&self, key: &CityKey) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &CityKey) -> Option<&CitySummary> {
        self.0.iter().find(|city| city.has_key(key))
    }

    pub fn keys(&self) -> Vec<CityKey> {
        self.0.iter().map(CitySummary::key).collect()
    }

    /// Split into (day, night) groups, keeping server order within each.
    pub fn partition_day_night(&self) -> (Vec<&CitySummary>, Vec<&CitySummary>) {
        self.0.iter().partition(|city| city.is_day)
    }
}

impl TryFrom<Vec<CitySummary>> for WatchList {
    type Error = DuplicateCity;

    fn try_from(entries: Vec<CitySummary>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<WatchList> for Vec<CitySummary> {
    fn from(list: WatchList) -> Self {
        list.0
    }
}

impl<'a> IntoIterator for &'a WatchList {
    type Item = &'a CitySummary;
    type IntoIter = std::slice::Iter<'a, CitySummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A free-text query resolved to a concrete city.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub key: CityKey,
    pub display_name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// One point of the forecast series shown in the detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub time: String,
    pub temperature: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(name: &str, cc: &str, is_day: bool) -> CitySummary {
        CitySummary { is_day, ..CitySummary::new(CityKey::new(name, cc)) }
    }

    #[test]
    fn city_key_equality_is_case_sensitive() {
        assert_eq!(CityKey::new("Paris", "FR"), CityKey::new("Paris", "FR"));
        assert_ne!(CityKey::new("Paris", "FR"), CityKey::new("paris", "FR"));
        assert_ne!(CityKey::new("Paris", "FR"), CityKey::new("Paris", "US"));
    }

    #[test]
    fn path_segment_joins_name_and_country() {
        let key = CityKey::new("New York", "US");
        assert_eq!(key.path_segment(), "New York,US");
        assert_eq!(key.to_string(), "New York,US");
    }

    #[test]
    fn watch_list_rejects_duplicate_keys() {
        let err = WatchList::new(vec![city("Paris", "FR", true), city("Paris", "FR", false)])
            .unwrap_err();
        assert_eq!(err, DuplicateCity(CityKey::new("Paris", "FR")));

        let ok = WatchList::new(vec![city("Paris", "FR", true), city("Paris", "US", true)]);
        assert!(ok.is_ok());
    }

    #[test]
    fn decoding_duplicates_fails() {
        let body = r#"[{"name":"Oslo","country_code":"NO"},{"name":"Oslo","country_code":"NO"}]"#;
        let err = serde_json::from_str::<WatchList>(body).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn decodes_full_summary_entry() {
        let body = r#"{
            "name": "Prague", "country_code": "CZ",
            "lon": "14.42°E", "lat": "50.09°N", "dt": 1700000000,
            "temperature": 3.4, "feels_like": 0.1, "humidity": 81, "wind_speed": 4.1,
            "main": "Clouds", "description": "overcast clouds",
            "current_time": "14:05 14.11.2023",
            "sunrise_dt": 1, "sunset_dt": 2,
            "sunrise_readable": "07:01", "sunset_readable": "16:17",
            "is_day": true, "icon": "https://openweathermap.org/img/wn/04d@2x.png"
        }"#;

        let parsed: CitySummary = serde_json::from_str(body).expect("summary entry should decode");
        assert_eq!(parsed.key(), CityKey::new("Prague", "CZ"));
        assert_eq!(parsed.humidity, Some(81.0));
        assert_eq!(parsed.lat, Some(Coordinate::Formatted("50.09°N".into())));
        assert!(parsed.is_day);
        assert_eq!(parsed.observed_at().map(|t| t.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn decodes_lean_entry_with_numeric_coordinates() {
        let body = r#"{"name":"Sydney","country_code":"AU","lat":-33.87,"lon":151.21}"#;
        let parsed: CitySummary = serde_json::from_str(body).expect("lean entry should decode");
        assert_eq!(parsed.lat, Some(Coordinate::Degrees(-33.87)));
        assert_eq!(parsed.temperature, None);
        assert!(!parsed.is_day);
    }

    #[test]
    fn partition_keeps_server_order() {
        let list = WatchList::new(vec![
            city("Taipei", "TW", false),
            city("Prague", "CZ", true),
            city("Sydney", "AU", false),
            city("Boston", "US", true),
        ])
        .unwrap();

        let (day, night) = list.partition_day_night();
        let names = |v: &[&CitySummary]| v.iter().map(|c| c.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&day[..]), ["Prague", "Boston"]);
        assert_eq!(names(&night[..]), ["Taipei", "Sydney"]);
    }

    #[test]
    fn lookup_by_key() {
        let list = WatchList::new(vec![city("Boston", "US", true)]).unwrap();
        assert!(list.contains(&CityKey::new("Boston", "US")));
        assert!(!list.contains(&CityKey::new("Boston", "GB")));
        assert_eq!(list.keys(), vec![CityKey::new("Boston", "US")]);
    }
}
