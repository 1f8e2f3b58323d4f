use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, header::ACCEPT};
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{
    error::DirectoryError,
    model::{CityKey, GeocodeResult, TimeSeriesPoint, WatchList},
};

use super::WeatherDirectory;

const SUMMARY_PATH: &str = "/api/weather/summary";
const TIMESERIES_PATH: &str = "/api/weather/timeseries";
const COORDINATES_PATH: &str = "/api/weather/coordinates";
const ADD_PATH: &str = "/api/weather/city";
const DELETE_PATH: &str = "/api/weather/delete";

/// [`WeatherDirectory`] backed by the dashboard's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    base_url: String,
    http: Client,
}

impl HttpDirectory {
    /// Build a client whose requests fail with a transport error after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, http))
    }

    pub fn with_client(base_url: &str, http: Client) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}{path}/{segment}`, with the segment percent-encoded as one unit.
    fn url(&self, path: &str, segment: Option<&str>) -> String {
        match segment {
            Some(segment) => {
                format!("{}{}/{}", self.base_url, path, urlencoding::encode(segment))
            }
            None => format!("{}{}", self.base_url, path),
        }
    }

    /// Send a request and return the body of a 2xx response.
    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<String, DirectoryError> {
        let res = request.header(ACCEPT, "application/json").send().await.map_err(|source| {
            warn!(operation, error = %source, "weather API unreachable");
            DirectoryError::Transport { operation, source }
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| {
            warn!(operation, error = %source, "failed to read weather API response body");
            DirectoryError::Transport { operation, source }
        })?;

        if !status.is_success() {
            debug!(operation, %status, body = %truncate_body(&body), "weather API returned an error");
            return Err(DirectoryError::Status { status: status.as_u16() });
        }

        Ok(body)
    }

    fn decode<T: DeserializeOwned>(operation: &'static str, body: &str) -> Result<T, DirectoryError> {
        serde_json::from_str(body).map_err(|source| {
            warn!(operation, error = %source, body = %truncate_body(body), "unexpected weather API payload");
            DirectoryError::Malformed { operation, source }
        })
    }

    async fn mutate(
        &self,
        operation: &'static str,
        path: &str,
        key: &CityKey,
    ) -> Result<WatchList, DirectoryError> {
        let url = self.url(path, Some(&key.path_segment()));
        let body = self.send(operation, self.http.post(url)).await?;
        let payload: MutationPayload = Self::decode(operation, &body)?;
        Ok(payload.into_list())
    }
}

/// Mutations answer either with the summary-shaped array or with the
/// `{"cities": [...]}` envelope of lean entries.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MutationPayload {
    List(WatchList),
    Envelope { cities: WatchList },
}

impl MutationPayload {
    fn into_list(self) -> WatchList {
        match self {
            MutationPayload::List(list) | MutationPayload::Envelope { cities: list } => list,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodePayload {
    name: Option<String>,
    country_code: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl GeocodePayload {
    fn into_result(self) -> Option<GeocodeResult> {
        let name = self.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())?;
        let country_code =
            self.country_code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())?;

        Some(GeocodeResult {
            display_name: format!("{name}, {country_code}"),
            key: CityKey { name, country_code },
            lat: self.lat,
            lon: self.lon,
        })
    }
}

#[async_trait]
impl WeatherDirectory for HttpDirectory {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_summary(&self) -> Result<WatchList, DirectoryError> {
        let body = self.send("summary", self.http.get(self.url(SUMMARY_PATH, None))).await?;
        Self::decode("summary", &body)
    }

    #[instrument(skip(self), level = "debug")]
    async fn geocode(&self, free_text: &str) -> Result<GeocodeResult, DirectoryError> {
        let not_found = || DirectoryError::NotFound { input: free_text.to_string() };

        let url = self.url(COORDINATES_PATH, Some(free_text));
        let body = match self.send("geocode", self.http.get(url)).await {
            Err(DirectoryError::Status { status: 400 | 404 }) => return Err(not_found()),
            other => other?,
        };

        let payload: GeocodePayload = Self::decode("geocode", &body)?;
        payload.into_result().ok_or_else(not_found)
    }

    #[instrument(skip(self), level = "debug")]
    async fn add_city(&self, key: &CityKey) -> Result<WatchList, DirectoryError> {
        self.mutate("add city", ADD_PATH, key).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn remove_city(&self, key: &CityKey) -> Result<WatchList, DirectoryError> {
        self.mutate("remove city", DELETE_PATH, key).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn timeseries(&self, key: &CityKey) -> Result<Vec<TimeSeriesPoint>, DirectoryError> {
        let url = self.url(TIMESERIES_PATH, Some(&key.path_segment()));
        let body = self.send("timeseries", self.http.get(url)).await?;
        Self::decode("timeseries", &body)
    }
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory(base: &str) -> HttpDirectory {
        HttpDirectory::with_client(base, Client::new())
    }

    #[test]
    fn url_encodes_segment_as_one_unit() {
        let dir = directory("http://localhost:8000/");
        let key = CityKey::new("New York", "US");

        assert_eq!(
            dir.url(DELETE_PATH, Some(&key.path_segment())),
            "http://localhost:8000/api/weather/delete/New%20York%2CUS"
        );
        assert_eq!(dir.url(SUMMARY_PATH, None), "http://localhost:8000/api/weather/summary");
    }

    #[test]
    fn url_encodes_slashes_inside_segment() {
        let dir = directory("http://localhost:8000");
        assert_eq!(
            dir.url(COORDINATES_PATH, Some("a/b")),
            "http://localhost:8000/api/weather/coordinates/a%2Fb"
        );
    }

    #[test]
    fn geocode_payload_requires_name_and_country() {
        let ok = GeocodePayload {
            name: Some("London".into()),
            country_code: Some("GB".into()),
            lat: Some(51.5),
            lon: Some(-0.13),
        }
        .into_result()
        .expect("complete payload resolves");
        assert_eq!(ok.key, CityKey::new("London", "GB"));
        assert_eq!(ok.display_name, "London, GB");

        let missing = GeocodePayload {
            name: Some("London".into()),
            country_code: Some("  ".into()),
            lat: None,
            lon: None,
        };
        assert!(missing.into_result().is_none());
    }

    #[test]
    fn mutation_payload_accepts_both_shapes() {
        let bare: MutationPayload =
            serde_json::from_str(r#"[{"name":"Oslo","country_code":"NO"}]"#).unwrap();
        let envelope: MutationPayload = serde_json::from_str(
            r#"{"cities":[{"name":"Oslo","country_code":"NO","lat":59.9,"lon":10.7}]}"#,
        )
        .unwrap();

        assert_eq!(bare.into_list().keys(), vec![CityKey::new("Oslo", "NO")]);
        assert_eq!(envelope.into_list().keys(), vec![CityKey::new("Oslo", "NO")]);
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        assert_eq!(truncate_body(&long).chars().count(), 200);
        assert_eq!(truncate_body("short"), "short");
    }
}
