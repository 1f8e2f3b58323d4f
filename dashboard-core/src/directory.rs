use crate::{
    Config,
    error::DirectoryError,
    model::{CityKey, GeocodeResult, TimeSeriesPoint, WatchList},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod http;

pub use http::HttpDirectory;

/// Remote operations on the shared watch-list.
///
/// Implementations hold no state between calls. Every mutation answers with
/// the full list as the server sees it after the call.
#[async_trait]
pub trait WeatherDirectory: Send + Sync + Debug {
    async fn fetch_summary(&self) -> Result<WatchList, DirectoryError>;

    /// Resolve free text to a city. The text is sent as given.
    async fn geocode(&self, free_text: &str) -> Result<GeocodeResult, DirectoryError>;

    /// Add a city. Adding one that is already watched returns the unchanged list.
    async fn add_city(&self, key: &CityKey) -> Result<WatchList, DirectoryError>;

    /// Remove a city. Removing one that is not watched returns the unchanged list.
    async fn remove_city(&self, key: &CityKey) -> Result<WatchList, DirectoryError>;

    async fn timeseries(&self, key: &CityKey) -> Result<Vec<TimeSeriesPoint>, DirectoryError>;
}

/// Construct the HTTP directory from config.
pub fn directory_from_config(config: &Config) -> anyhow::Result<HttpDirectory> {
    HttpDirectory::new(config.base_url(), config.request_timeout()).map_err(|e| {
        anyhow::anyhow!("Failed to build HTTP client for {}: {e}", config.base_url())
    })
}
