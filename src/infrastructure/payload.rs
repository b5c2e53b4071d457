// Decoding of upstream JSON payloads into domain models
use crate::domain::channel::ChannelTable;
use crate::domain::house::House;
use crate::domain::reading::{ForecastPoint, ForecastSet, Reading};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use thiserror::Error;

/// Forecast horizons in hours; `168 * n` is `n` weeks ahead.
pub const FORECAST_HORIZONS_HOURS: [u32; 3] = [168, 336, 504];

const HOURS_PER_WEEK: u32 = 168;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("response body is not JSON")]
    Unparseable,
}

/// Parse a JSON document that may be wrapped in other text.
///
/// Tries the whole body first, then the outermost `[...]`, then the outermost `{...}`.
pub fn parse_lenient(text: &str) -> Result<Value, PayloadError> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    [('[', ']'), ('{', '}')]
        .iter()
        .filter_map(|(open, close)| slice_between(trimmed, *open, *close))
        .find_map(|candidate| serde_json::from_str(candidate).ok())
        .ok_or(PayloadError::Unparseable)
}

fn slice_between(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Unwrap the list of records from an array, a `results`/`data` wrapper,
/// the first array-valued key, or a single bare record.
fn records(root: Value) -> Vec<Value> {
    match root {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            let key = ["results", "data"]
                .iter()
                .map(|k| k.to_string())
                .find(|k| map.get(k).is_some_and(Value::is_array))
                .or_else(|| {
                    map.iter()
                        .find(|(_, v)| v.is_array())
                        .map(|(k, _)| k.clone())
                });

            match key.and_then(|k| map.remove(&k)) {
                Some(Value::Array(items)) => items,
                _ => vec![Value::Object(map)],
            }
        }
        other => vec![other],
    }
}

/// Django serializes models as `{ "model", "pk", "fields": {...} }`.
fn fields(record: &Value) -> &Value {
    match record.get("fields") {
        Some(inner) if inner.is_object() => inner,
        _ => record,
    }
}

/// A finite number, from a JSON number or a numeric string.
fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Anything other than null, `false`, `0` or an empty string.
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn positive_id(value: &Value) -> Option<u64> {
    let n = number(value)?;
    (n >= 1.0 && n.fract() == 0.0 && n <= u64::MAX as f64).then_some(n as u64)
}

/// Accepts RFC 3339, naive date-times (taken as UTC) and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn timestamp_of(fields: &Value) -> Option<DateTime<Utc>> {
    ["timestamp", "time", "date"]
        .iter()
        .filter_map(|k| fields.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .and_then(parse_timestamp)
}

/// Decode one reading record, or `None` when any field is missing or malformed.
pub fn decode_reading(record: &Value) -> Option<Reading> {
    let f = fields(record);

    // Only absent or empty keys fall through to the next alias; an invalid id drops the record.
    let id = ["detector_id", "detectorId", "id", "detector"]
        .iter()
        .filter_map(|k| f.get(*k))
        .find(|v| is_set(v))
        .and_then(positive_id)?;
    let channel_id = u32::try_from(id).ok()?;

    // An explicit `value: null` does not fall back to `v`.
    let value = match f.get("value") {
        Some(v) => number(v)?,
        None => number(f.get("v")?)?,
    };

    let timestamp = timestamp_of(f)?;

    Some(Reading::new(channel_id, timestamp, value))
}

pub fn decode_readings(text: &str) -> Result<Vec<Reading>, PayloadError> {
    let all = records(parse_lenient(text)?);
    let total = all.len();

    let readings: Vec<Reading> = all.iter().filter_map(decode_reading).collect();
    if readings.len() < total {
        tracing::debug!(
            "Skipped {} malformed readings out of {}",
            total - readings.len(),
            total
        );
    }

    Ok(readings)
}

/// Decode the latest forecast into 3 points per target channel.
///
/// Missing or non-numeric fields become unknown points. An empty payload
/// yields unknown points for every channel.
pub fn decode_forecast(text: &str, channels: &ChannelTable) -> Result<ForecastSet, PayloadError> {
    let root = parse_lenient(text)?;

    let latest = match root {
        Value::Array(items) => latest_entry(items),
        Value::Null => None,
        other => Some(other),
    };
    let empty = Value::Null;
    let source = latest.as_ref().map(fields).unwrap_or(&empty);

    let forecast = channels
        .channels()
        .iter()
        .map(|channel| {
            let points = FORECAST_HORIZONS_HOURS
                .iter()
                .map(|hours| {
                    let key = format!("{}_{}", channel.forecast_field, hours);
                    let value = source
                        .get(&key)
                        .and_then(number)
                        .map(|v| v * channel.forecast_scale);
                    ForecastPoint::new(hours / HOURS_PER_WEEK, value)
                })
                .collect();
            (channel.id, points)
        })
        .collect();

    Ok(forecast)
}

/// Most recent entry by `timestamp`; entries without a parseable one never replace another.
fn latest_entry(items: Vec<Value>) -> Option<Value> {
    let mut latest: Option<(Option<DateTime<Utc>>, Value)> = None;
    for item in items {
        let ts = fields(&item)
            .get("timestamp")
            .or_else(|| item.get("timestamp"))
            .and_then(Value::as_str)
            .and_then(parse_timestamp);

        let newer = match (&latest, ts) {
            (None, _) => true,
            (Some((None, _)), Some(_)) => true,
            (Some((Some(current), _)), Some(candidate)) => candidate > *current,
            _ => false,
        };
        if newer {
            latest = Some((ts, item));
        }
    }
    latest.map(|(_, item)| item)
}

pub fn decode_houses(text: &str) -> Result<Vec<House>, PayloadError> {
    let mut houses: Vec<House> = records(parse_lenient(text)?)
        .iter()
        .filter_map(|record| {
            let f = fields(record);
            let id = record
                .get("pk")
                .or_else(|| f.get("id"))
                .and_then(positive_id)?;
            let text_field = |key: &str| f.get(key).and_then(Value::as_str).unwrap_or_default();

            let address = match text_field("address") {
                "" => "Адрес не указан",
                a => a,
            };
            Some(House::new(
                id,
                text_field("name").to_string(),
                address.to_string(),
                text_field("description"),
            ))
        })
        .collect();

    houses.sort_by_key(|h| h.id);
    Ok(houses)
}
