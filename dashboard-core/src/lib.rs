//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - The watch-list data model (city keys, summaries, time series)
//! - A client for the dashboard's weather API
//! - The coordinator that owns the local watch-list and mediates add/remove
//! - Configuration handling and the summary/detail view router
//!
//! It is used by `dashboard-cli`, but can also be reused by other front ends.

pub mod config;
pub mod coordinator;
pub mod directory;
pub mod error;
pub mod model;
pub mod normalize;
pub mod router;

pub use config::{ApiConfig, Config};
pub use coordinator::{
    AddOutcome, CityListCoordinator, ListSnapshot, Notice, NoticeLevel, PendingOp, RemoveOutcome,
    SyncPhase,
};
pub use directory::{HttpDirectory, WeatherDirectory, directory_from_config};
pub use error::{DirectoryError, FlowError};
pub use model::{CityKey, CitySummary, Coordinate, GeocodeResult, TimeSeriesPoint, WatchList};
pub use router::{View, ViewRouter};
