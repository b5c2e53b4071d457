use crate::domain::channel::{Aggregation, ChannelTable, TargetChannel};
use crate::domain::chart::{ChartSpec, SeriesSpec, UnitKind, default_layout};
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub upstream: UpstreamSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub readings_path: String,
    pub forecast_path: String,
    pub houses_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub proxies: Vec<ProxyConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProxyConfig {
    pub prefix: String,
    #[serde(default)]
    pub encode_target: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
    #[serde(default = "default_weeks")]
    pub default_past_weeks: u32,
    #[serde(default = "default_weeks")]
    pub default_future_weeks: u32,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ChannelsConfig {
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
    #[serde(default)]
    pub charts: Vec<ChartConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChannelConfig {
    pub target: u32,
    pub name: String,
    pub aggregation: Aggregation,
    pub detectors: Vec<u32>,
    pub forecast_field: String,
    #[serde(default = "default_scale")]
    pub forecast_scale: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    pub id: String,
    pub title: String,
    pub unit: String,
    #[serde(default)]
    pub series: Vec<SeriesConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeriesConfig {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub targets: Vec<u32>,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_weeks() -> u32 {
    10
}

fn default_scale() -> f64 {
    1.0
}

pub fn load_service_config() -> anyhow::Result<ServiceConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/service"))
        .add_source(
            config::Environment::with_prefix("PREDICTECH")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .context("Failed to read config/service")?;

    Ok(settings.try_deserialize()?)
}

pub fn load_channels_config() -> anyhow::Result<ChannelsConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/channels").required(false))
        .build()
        .context("Failed to read config/channels")?;

    Ok(settings.try_deserialize()?)
}

impl ChannelsConfig {
    /// Channel table from configuration, or the built-in groups when none are configured.
    pub fn channel_table(&self) -> ChannelTable {
        if self.channels.is_empty() {
            return ChannelTable::default();
        }

        let channels = self
            .channels
            .iter()
            .map(|c| {
                TargetChannel::new(
                    c.target,
                    c.name.clone(),
                    c.aggregation,
                    c.detectors.clone(),
                    c.forecast_field.clone(),
                    c.forecast_scale,
                )
            })
            .collect();

        ChannelTable::new(channels)
    }

    /// Chart layout from configuration, or the built-in four charts.
    pub fn chart_layout(&self) -> Vec<ChartSpec> {
        if self.charts.is_empty() {
            return default_layout();
        }

        self.charts
            .iter()
            .map(|c| {
                let unit = match c.unit.as_str() {
                    "flow" => UnitKind::Flow,
                    _ => UnitKind::Temperature,
                };
                ChartSpec {
                    id: c.id.clone(),
                    title: c.title.clone(),
                    unit,
                    series: c
                        .series
                        .iter()
                        .map(|s| SeriesSpec {
                            id: s.id.clone(),
                            name: s.name.clone(),
                            color: s.color.clone(),
                            targets: s.targets.clone(),
                        })
                        .collect(),
                }
            })
            .collect()
    }
}

/// Replace `${name}` placeholders in an endpoint template.
pub fn expand_template(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
