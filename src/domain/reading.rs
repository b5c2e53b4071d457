// Reading and forecast domain models
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Ordered weekly values, index 0 = oldest. `None` marks a week without data.
pub type Series = Vec<Option<f64>>;

/// Raw forecast points per target channel.
pub type ForecastSet = BTreeMap<u32, Vec<ForecastPoint>>;

/// One detector observation as received from the telemetry endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub channel_id: u32,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Reading {
    pub fn new(channel_id: u32, timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            channel_id,
            timestamp,
            value,
        }
    }
}

/// Forecast value `offset_weeks` weeks after now. Only points with a value seed extrapolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub offset_weeks: u32,
    pub value: Option<f64>,
}

impl ForecastPoint {
    pub fn new(offset_weeks: u32, value: Option<f64>) -> Self {
        Self {
            offset_weeks,
            value,
        }
    }

    pub fn is_known(&self) -> bool {
        self.value.is_some_and(f64::is_finite)
    }
}

/// Round half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
