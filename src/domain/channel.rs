// Channel groups - which detectors roll up into which target channel
use serde::Deserialize;
use std::collections::HashMap;

/// How readings inside one weekly bucket are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Volumetric flow: bucket total.
    Sum,
    /// Temperature: arithmetic mean of the bucket.
    Mean,
}

impl Aggregation {
    /// Decimal places kept in the aggregated value.
    pub fn precision(self) -> u32 {
        match self {
            Aggregation::Sum => 3,
            Aggregation::Mean => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TargetChannel {
    pub id: u32,
    pub name: String,
    pub aggregation: Aggregation,
    pub detectors: Vec<u32>,
    /// Prefix of the `<prefix>_<hours>` forecast fields.
    pub forecast_field: String,
    /// Multiplier applied to raw forecast values.
    pub forecast_scale: f64,
}

impl TargetChannel {
    pub fn new(
        id: u32,
        name: String,
        aggregation: Aggregation,
        detectors: Vec<u32>,
        forecast_field: String,
        forecast_scale: f64,
    ) -> Self {
        Self {
            id,
            name,
            aggregation,
            detectors,
            forecast_field,
            forecast_scale,
        }
    }
}

/// Static mapping from raw detector ids to target channels.
#[derive(Debug, Clone)]
pub struct ChannelTable {
    channels: Vec<TargetChannel>,
    by_detector: HashMap<u32, usize>,
}

impl ChannelTable {
    /// Build the table. A detector listed under several targets belongs to the first one.
    pub fn new(channels: Vec<TargetChannel>) -> Self {
        let mut by_detector = HashMap::new();
        for (idx, channel) in channels.iter().enumerate() {
            for detector in &channel.detectors {
                by_detector.entry(*detector).or_insert(idx);
            }
        }
        Self {
            channels,
            by_detector,
        }
    }

    pub fn target_for(&self, detector_id: u32) -> Option<&TargetChannel> {
        self.by_detector
            .get(&detector_id)
            .map(|idx| &self.channels[*idx])
    }

    pub fn get(&self, target_id: u32) -> Option<&TargetChannel> {
        self.channels.iter().find(|c| c.id == target_id)
    }

    pub fn channels(&self) -> &[TargetChannel] {
        &self.channels
    }
}

impl Default for ChannelTable {
    fn default() -> Self {
        Self::new(vec![
            TargetChannel::new(
                1,
                "Общее потребление ХВС".to_string(),
                Aggregation::Sum,
                vec![1, 5, 9, 13, 17],
                "flow_xvs".to_string(),
                1000.0,
            ),
            TargetChannel::new(
                2,
                "Общее потребление ГВС".to_string(),
                Aggregation::Sum,
                vec![2, 6, 10, 14, 18],
                "flow_gvs".to_string(),
                1000.0,
            ),
            TargetChannel::new(
                3,
                "Подача".to_string(),
                Aggregation::Mean,
                vec![3],
                "temp_supply".to_string(),
                1.0,
            ),
            TargetChannel::new(
                4,
                "Обратка".to_string(),
                Aggregation::Mean,
                vec![4],
                "temp_return".to_string(),
                1.0,
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_groups() {
        let table = ChannelTable::default();

        assert_eq!(table.target_for(13).map(|c| c.id), Some(1));
        assert_eq!(table.target_for(6).map(|c| c.id), Some(2));
        assert_eq!(table.target_for(3).map(|c| c.id), Some(3));
        assert_eq!(table.target_for(4).map(|c| c.id), Some(4));
        assert!(table.target_for(7).is_none());

        assert_eq!(table.get(1).map(|c| c.aggregation), Some(Aggregation::Sum));
        assert_eq!(table.get(4).map(|c| c.aggregation), Some(Aggregation::Mean));
    }

    #[test]
    fn test_first_group_wins() {
        let table = ChannelTable::new(vec![
            TargetChannel::new(1, "a".into(), Aggregation::Sum, vec![1, 2], "a".into(), 1.0),
            TargetChannel::new(2, "b".into(), Aggregation::Mean, vec![2], "b".into(), 1.0),
        ]);
        assert_eq!(table.target_for(2).map(|c| c.id), Some(1));
    }
}
