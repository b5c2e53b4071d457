// Weekly aggregation of raw readings into per-channel historical series
use super::channel::{Aggregation, ChannelTable};
use super::reading::{Reading, Series, round_to};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// Accumulated readings for one target channel and one week.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeeklyBucket {
    pub sum: f64,
    pub count: u32,
}

impl WeeklyBucket {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn resolve(&self, aggregation: Aggregation) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        let raw = match aggregation {
            Aggregation::Sum => self.sum,
            Aggregation::Mean => self.sum / self.count as f64,
        };
        Some(round_to(raw, aggregation.precision()))
    }
}

/// Whole weeks between `timestamp` and `now`, floored. Negative for future timestamps.
pub fn weeks_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let week_ms = Duration::weeks(1).num_milliseconds();
    (now - timestamp).num_milliseconds().div_euclid(week_ms)
}

/// Bucket readings into `past_weeks + 1` weekly slots per target channel.
///
/// Index 0 is the oldest week and index `past_weeks` the current one. Readings
/// from unmapped detectors, with non-finite values, or falling outside
/// `[0, past_weeks]` weeks ago are skipped. Every configured target is present
/// in the result, with `None` for weeks that received no readings.
pub fn aggregate(
    readings: &[Reading],
    channels: &ChannelTable,
    past_weeks: u32,
    now: DateTime<Utc>,
) -> BTreeMap<u32, Series> {
    let len = past_weeks as usize + 1;
    let mut buckets: BTreeMap<u32, Vec<WeeklyBucket>> = channels
        .channels()
        .iter()
        .map(|c| (c.id, vec![WeeklyBucket::default(); len]))
        .collect();

    let mut dropped = 0usize;
    for reading in readings {
        let Some(target) = channels.target_for(reading.channel_id) else {
            dropped += 1;
            continue;
        };
        if !reading.value.is_finite() {
            dropped += 1;
            continue;
        }

        let weeks = weeks_ago(reading.timestamp, now);
        if weeks < 0 || weeks > past_weeks as i64 {
            dropped += 1;
            continue;
        }

        let idx = past_weeks as usize - weeks as usize;
        if let Some(slots) = buckets.get_mut(&target.id) {
            slots[idx].add(reading.value);
        }
    }

    tracing::debug!(
        "Aggregated {} readings into {} weekly slots, {} skipped",
        readings.len() - dropped,
        len,
        dropped
    );

    channels
        .channels()
        .iter()
        .map(|channel| {
            let series = buckets
                .get(&channel.id)
                .map(|slots| {
                    slots
                        .iter()
                        .map(|b| b.resolve(channel.aggregation))
                        .collect()
                })
                .unwrap_or_else(|| vec![None; len]);
            (channel.id, series)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::channel::TargetChannel;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    fn reading(id: u32, days_ago: i64, value: f64) -> Reading {
        Reading::new(id, now() - Duration::days(days_ago), value)
    }

    #[test]
    fn test_empty_readings_yield_null_series() {
        let table = ChannelTable::default();
        let result = aggregate(&[], &table, 3, now());

        assert_eq!(result.len(), 4);
        for series in result.values() {
            assert_eq!(series, &vec![None; 4]);
        }
    }

    #[test]
    fn test_flow_channels_are_summed() {
        let table = ChannelTable::default();
        let readings = vec![reading(1, 1, 2.0), reading(5, 2, 3.0)];
        let result = aggregate(&readings, &table, 2, now());

        assert_eq!(result[&1], vec![None, None, Some(5.0)]);
    }

    #[test]
    fn test_temperature_channels_are_averaged() {
        let table = ChannelTable::default();
        let readings = vec![reading(3, 1, 2.0), reading(3, 2, 3.0)];
        let result = aggregate(&readings, &table, 2, now());

        assert_eq!(result[&3], vec![None, None, Some(2.5)]);
    }

    #[test]
    fn test_rounding_per_aggregation() {
        let table = ChannelTable::default();
        let readings = vec![
            reading(2, 0, 0.1234),
            reading(2, 0, 0.0002),
            reading(4, 0, 40.0),
            reading(4, 0, 41.0),
            reading(4, 0, 41.0),
        ];
        let result = aggregate(&readings, &table, 0, now());

        assert_eq!(result[&2], vec![Some(0.124)]);
        assert_eq!(result[&4], vec![Some(40.67)]);
    }

    #[test]
    fn test_out_of_range_readings_are_ignored() {
        let table = ChannelTable::default();
        let in_range = vec![reading(1, 3, 4.0), reading(3, 8, 20.0)];
        let baseline = aggregate(&in_range, &table, 2, now());

        let mut noisy = in_range.clone();
        noisy.push(reading(1, 21, 100.0));
        noisy.push(reading(3, 400, 100.0));
        noisy.push(Reading::new(1, now() + Duration::hours(1), 100.0));
        noisy.push(reading(42, 1, 100.0));
        noisy.push(reading(1, 1, f64::NAN));

        assert_eq!(aggregate(&noisy, &table, 2, now()), baseline);
    }

    #[test]
    fn test_empty_bucket_is_null_not_zero() {
        let table = ChannelTable::default();
        let readings = vec![reading(1, 0, 0.0)];
        let result = aggregate(&readings, &table, 1, now());

        assert_eq!(result[&1], vec![None, Some(0.0)]);
        assert!(result[&3].iter().all(Option::is_none));
    }

    #[test]
    fn test_bucket_placement_follows_floor_of_days() {
        let table = ChannelTable::new(vec![TargetChannel::new(
            1,
            "flow".into(),
            Aggregation::Sum,
            vec![1, 5],
            "flow".into(),
            1.0,
        )]);
        let readings = vec![reading(1, 3, 4.0), reading(5, 10, 6.0)];
        let result = aggregate(&readings, &table, 2, now());

        // 3 days ago -> week 0 (index 2), 10 days ago -> week 1 (index 1)
        assert_eq!(result[&1], vec![None, Some(6.0), Some(4.0)]);
    }

    #[test]
    fn test_week_boundaries() {
        assert_eq!(weeks_ago(now(), now()), 0);
        assert_eq!(weeks_ago(now() - Duration::days(7), now()), 1);
        assert_eq!(weeks_ago(now() - Duration::days(7) + Duration::milliseconds(1), now()), 0);
        assert_eq!(weeks_ago(now() + Duration::milliseconds(1), now()), -1);
    }
}
