// Repository trait for telemetry data access
use crate::domain::house::House;
use crate::domain::reading::{ForecastSet, Reading};
use crate::infrastructure::payload::PayloadError;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The direct request and every proxy route failed.
    #[error("failed to load {url}: {last_error}")]
    AllRoutesFailed { url: String, last_error: String },

    #[error("unusable payload: {0}")]
    Payload(#[from] PayloadError),
}

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// Raw detector readings. Malformed records are already filtered out.
    async fn fetch_readings(&self) -> Result<Vec<Reading>, FetchError>;

    /// The most recent 3-point forecast for a house, keyed by target channel.
    async fn fetch_forecast(&self, house_id: u64) -> Result<ForecastSet, FetchError>;

    /// All houses, ordered by id.
    async fn list_houses(&self) -> Result<Vec<House>, FetchError>;
}
