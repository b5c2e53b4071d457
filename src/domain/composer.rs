// Composition of historical and forecast series for display
use super::reading::{Series, round_to};
use chrono::{DateTime, Duration, Utc};

/// Lay `forecast` after `historical` unchanged.
pub fn compose(historical: &[Option<f64>], forecast: &[Option<f64>]) -> Series {
    let mut series = Vec::with_capacity(historical.len() + forecast.len());
    series.extend_from_slice(historical);
    series.extend_from_slice(forecast);
    series
}

/// Week offset labels: "-N нед" … "Сейчас" … "+M нед".
pub fn week_labels(past_weeks: u32, future_weeks: u32) -> Vec<String> {
    (-(past_weeks as i64)..=future_weeks as i64)
        .map(|offset| match offset {
            0 => "Сейчас".to_string(),
            o if o < 0 => format!("{} нед", o),
            o => format!("+{} нед", o),
        })
        .collect()
}

/// Calendar dates (dd.mm.yyyy) matching `week_labels` index for index.
pub fn week_dates(now: DateTime<Utc>, past_weeks: u32, future_weeks: u32) -> Vec<String> {
    (-(past_weeks as i64)..=future_weeks as i64)
        .map(|offset| (now + Duration::weeks(offset)).format("%d.%m.%Y").to_string())
        .collect()
}

/// Per-index mean of several series, `None` wherever any input is missing.
pub fn mean_of(series: &[&Series], places: u32) -> Series {
    let len = series.iter().map(|s| s.len()).max().unwrap_or(0);
    if series.is_empty() {
        return Vec::new();
    }

    (0..len)
        .map(|idx| {
            let values: Option<Vec<f64>> = series
                .iter()
                .map(|s| s.get(idx).copied().flatten())
                .collect();
            values.map(|v| round_to(v.iter().sum::<f64>() / v.len() as f64, places))
        })
        .collect()
}
