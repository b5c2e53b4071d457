// Chart service - Weekly history plus forecast for a house
use crate::application::telemetry_repository::{FetchError, TelemetryRepository};
use crate::domain::aggregator::aggregate;
use crate::domain::channel::ChannelTable;
use crate::domain::chart::{ChartData, ChartPanel, ChartSpec, HouseCharts, SeriesData, SeriesSpec};
use crate::domain::composer::{compose, mean_of, week_dates, week_labels};
use crate::domain::extrapolator::{extrapolate, seed};
use crate::domain::reading::{ForecastPoint, ForecastSet, Reading, Series};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Compact panel: four past weeks, the current one and the raw 3-week forecast.
pub const PREVIEW_PAST_WEEKS: u32 = 4;
pub const PREVIEW_FUTURE_WEEKS: u32 = 3;

pub const MAX_WEEKS: u32 = 52;

const AVERAGE_PRECISION: u32 = 2;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("readings unavailable: {0}")]
    ReadingsUnavailable(#[source] FetchError),
}

/// Upstream data once both fetches have finished.
#[derive(Debug)]
pub struct SettledSources {
    pub readings: Vec<Reading>,
    pub forecast: ForecastSet,
    pub forecast_available: bool,
}

/// Join policy for the two upstream sources.
///
/// Readings are mandatory. A failed forecast degrades to an empty set, which
/// later extrapolates to all-`None` series.
pub fn settle_sources(
    readings: Result<Vec<Reading>, FetchError>,
    forecast: Result<ForecastSet, FetchError>,
) -> Result<SettledSources, ChartError> {
    let readings = readings.map_err(ChartError::ReadingsUnavailable)?;

    let (forecast, forecast_available) = match forecast {
        Ok(forecast) => (forecast, true),
        Err(e) => {
            tracing::warn!("Forecast unavailable, continuing without it: {}", e);
            (ForecastSet::new(), false)
        }
    };

    Ok(SettledSources {
        readings,
        forecast,
        forecast_available,
    })
}

type Forecaster = fn(&[ForecastPoint], usize) -> Series;

#[derive(Clone)]
pub struct ChartService {
    repository: Arc<dyn TelemetryRepository>,
    channels: ChannelTable,
    layout: Vec<ChartSpec>,
}

impl ChartService {
    pub fn new(
        repository: Arc<dyn TelemetryRepository>,
        channels: ChannelTable,
        layout: Vec<ChartSpec>,
    ) -> Self {
        Self {
            repository,
            channels,
            layout,
        }
    }

    pub async fn build(
        &self,
        house_id: u64,
        past_weeks: u32,
        future_weeks: u32,
        now: DateTime<Utc>,
    ) -> Result<HouseCharts, ChartError> {
        let past_weeks = past_weeks.clamp(1, MAX_WEEKS);
        let future_weeks = future_weeks.clamp(1, MAX_WEEKS);

        let (readings, forecast) = tokio::join!(
            self.repository.fetch_readings(),
            self.repository.fetch_forecast(house_id)
        );
        let sources = settle_sources(readings, forecast)?;

        tracing::debug!(
            "Building charts for house {}: {} readings, forecast for {} channels",
            house_id,
            sources.readings.len(),
            sources.forecast.len()
        );

        let preview = self.build_panel(&sources, PREVIEW_PAST_WEEKS, PREVIEW_FUTURE_WEEKS, now, seed);
        let extended = self.build_panel(&sources, past_weeks, future_weeks, now, extrapolate);

        Ok(HouseCharts {
            house_id,
            forecast_available: sources.forecast_available,
            preview,
            extended,
        })
    }

    fn build_panel(
        &self,
        sources: &SettledSources,
        past_weeks: u32,
        future_weeks: u32,
        now: DateTime<Utc>,
        forecaster: Forecaster,
    ) -> ChartPanel {
        let historical = aggregate(&sources.readings, &self.channels, past_weeks, now);

        let composed: BTreeMap<u32, Series> = historical
            .iter()
            .map(|(target, history)| {
                let points = sources
                    .forecast
                    .get(target)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                let forecast = forecaster(points, future_weeks as usize);
                (*target, compose(history, &forecast))
            })
            .collect();

        let len = (past_weeks + 1 + future_weeks) as usize;
        let charts = self
            .layout
            .iter()
            .map(|spec| ChartData {
                id: spec.id.clone(),
                title: spec.title.clone(),
                unit: spec.unit,
                series: spec
                    .series
                    .iter()
                    .map(|s| Self::series_data(s, &composed, len))
                    .collect(),
            })
            .collect();

        ChartPanel {
            labels: week_labels(past_weeks, future_weeks),
            dates: week_dates(now, past_weeks, future_weeks),
            boundary_index: past_weeks as usize,
            charts,
        }
    }

    fn series_data(spec: &SeriesSpec, composed: &BTreeMap<u32, Series>, len: usize) -> SeriesData {
        let empty = vec![None; len];
        let inputs: Vec<&Series> = spec
            .targets
            .iter()
            .map(|target| {
                composed.get(target).unwrap_or_else(|| {
                    tracing::warn!("Series {} refers to unknown channel {}", spec.id, target);
                    &empty
                })
            })
            .collect();

        let values = match inputs.as_slice() {
            [] => empty.clone(),
            [single] => (*single).clone(),
            many => mean_of(many, AVERAGE_PRECISION),
        };

        SeriesData::new(spec.id.clone(), spec.name.clone(), spec.color.clone(), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::default_layout;
    use crate::domain::house::House;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};

    struct StaticRepository {
        readings: Option<Vec<Reading>>,
        forecast: Option<ForecastSet>,
    }

    fn unavailable(url: &str) -> FetchError {
        FetchError::AllRoutesFailed {
            url: url.to_string(),
            last_error: "connection refused".to_string(),
        }
    }

    #[async_trait]
    impl TelemetryRepository for StaticRepository {
        async fn fetch_readings(&self) -> Result<Vec<Reading>, FetchError> {
            self.readings.clone().ok_or_else(|| unavailable("readings"))
        }

        async fn fetch_forecast(&self, _house_id: u64) -> Result<ForecastSet, FetchError> {
            self.forecast.clone().ok_or_else(|| unavailable("forecast"))
        }

        async fn list_houses(&self) -> Result<Vec<House>, FetchError> {
            Ok(Vec::new())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    fn service(readings: Option<Vec<Reading>>, forecast: Option<ForecastSet>) -> ChartService {
        let repository = Arc::new(StaticRepository { readings, forecast });
        ChartService::new(repository, ChannelTable::default(), default_layout())
    }

    fn forecast_for(target: u32, values: [Option<f64>; 3]) -> ForecastSet {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| ForecastPoint::new(i as u32 + 1, *v))
            .collect();
        ForecastSet::from([(target, points)])
    }

    fn series<'a>(panel: &'a ChartPanel, chart: &str, id: &str) -> &'a Series {
        let chart = panel.charts.iter().find(|c| c.id == chart).unwrap();
        &chart.series.iter().find(|s| s.id == id).unwrap().values
    }

    #[test]
    fn test_settle_requires_readings() {
        let result = settle_sources(Err(unavailable("readings")), Ok(ForecastSet::new()));
        assert!(matches!(result, Err(ChartError::ReadingsUnavailable(_))));
    }

    #[test]
    fn test_settle_tolerates_missing_forecast() {
        let settled = settle_sources(Ok(Vec::new()), Err(unavailable("forecast"))).unwrap();
        assert!(!settled.forecast_available);
        assert!(settled.forecast.is_empty());
    }

    #[tokio::test]
    async fn test_extended_panel_layout() {
        let readings = vec![
            Reading::new(1, now() - Duration::days(2), 3.0),
            Reading::new(9, now() - Duration::days(3), 2.0),
        ];
        let forecast = forecast_for(1, [Some(10.0), Some(14.0), None]);
        let charts = service(Some(readings), Some(forecast))
            .build(2, 2, 4, now())
            .await
            .unwrap();

        assert!(charts.forecast_available);
        let panel = &charts.extended;
        assert_eq!(panel.boundary_index, 2);
        assert_eq!(panel.labels.len(), 7);
        assert_eq!(panel.dates.len(), 7);
        assert_eq!(
            series(panel, "chart1", "xvs"),
            &vec![None, None, Some(5.0), Some(10.0), Some(14.0), Some(18.0), Some(22.0)]
        );
        assert_eq!(series(panel, "chart2", "gvs"), &vec![None; 7]);
    }

    #[tokio::test]
    async fn test_preview_panel_does_not_extrapolate() {
        let forecast = forecast_for(3, [Some(60.0), Some(61.0), None]);
        let charts = service(Some(Vec::new()), Some(forecast))
            .build(2, 10, 10, now())
            .await
            .unwrap();

        let panel = &charts.preview;
        assert_eq!(panel.boundary_index, 4);
        assert_eq!(panel.labels.len(), 8);
        assert_eq!(
            series(panel, "chart3", "supply"),
            &vec![None, None, None, None, None, Some(60.0), Some(61.0), None]
        );
        assert_eq!(series(&charts.extended, "chart3", "supply")[13], Some(62.0));
    }

    #[tokio::test]
    async fn test_average_temperature_series() {
        let readings = vec![
            Reading::new(3, now() - Duration::days(1), 60.0),
            Reading::new(4, now() - Duration::days(1), 41.0),
            Reading::new(3, now() - Duration::days(8), 58.0),
        ];
        let charts = service(Some(readings), None).build(2, 4, 3, now()).await.unwrap();

        assert!(!charts.forecast_available);
        let avg = series(&charts.preview, "chart4", "avg");
        assert_eq!(avg[4], Some(50.5));
        assert_eq!(avg[3], None);
        assert!(avg[5..].iter().all(Option::is_none));
    }

    #[tokio::test]
    async fn test_readings_failure_aborts() {
        let result = service(None, Some(ForecastSet::new())).build(2, 4, 4, now()).await;
        assert!(matches!(result, Err(ChartError::ReadingsUnavailable(_))));
    }

    #[tokio::test]
    async fn test_week_counts_are_clamped() {
        let charts = service(Some(Vec::new()), None).build(2, 0, 500, now()).await.unwrap();

        assert_eq!(charts.extended.boundary_index, 1);
        assert_eq!(charts.extended.labels.len(), 1 + 1 + MAX_WEEKS as usize);
    }
}
