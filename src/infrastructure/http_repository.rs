// HTTP repository implementation with proxy fallback
use crate::application::telemetry_repository::{FetchError, TelemetryRepository};
use crate::domain::channel::ChannelTable;
use crate::domain::house::House;
use crate::domain::reading::{ForecastSet, Reading};
use crate::infrastructure::config::{ProxyConfig, UpstreamSettings, expand_template};
use crate::infrastructure::payload::{decode_forecast, decode_houses, decode_readings};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpRepository {
    client: reqwest::Client,
    base_url: String,
    readings_path: String,
    forecast_path: String,
    houses_path: String,
    proxies: Vec<ProxyConfig>,
    channels: ChannelTable,
}

impl HttpRepository {
    pub fn new(settings: &UpstreamSettings, channels: ChannelTable) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            readings_path: settings.readings_path.clone(),
            forecast_path: settings.forecast_path.clone(),
            houses_path: settings.houses_path.clone(),
            proxies: settings.proxies.clone(),
            channels,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// The direct URL followed by each proxied variant, in the order they are tried.
    fn routes(&self, url: &str) -> Vec<String> {
        std::iter::once(url.to_string())
            .chain(self.proxies.iter().map(|proxy| {
                if proxy.encode_target {
                    format!("{}{}", proxy.prefix, urlencoding::encode(url))
                } else {
                    format!("{}{}", proxy.prefix, url)
                }
            }))
            .collect()
    }

    async fn get_text(&self, route: &str) -> Result<String> {
        let response = self
            .client
            .get(route)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP {}", response.status());
        }

        response.text().await.context("Failed to read response body")
    }

    /// Fetch `url` directly, then through each proxy until one answers with success.
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let mut last_error = String::from("no routes");

        for (attempt, route) in self.routes(url).iter().enumerate() {
            match self.get_text(route).await {
                Ok(body) => {
                    tracing::debug!("Loaded {} via route #{} ({} bytes)", url, attempt, body.len());
                    return Ok(body);
                }
                Err(e) => {
                    tracing::warn!("Route {} failed: {:#}", route, e);
                    last_error = format!("{:#}", e);
                }
            }
        }

        Err(FetchError::AllRoutesFailed {
            url: url.to_string(),
            last_error,
        })
    }
}

#[async_trait]
impl TelemetryRepository for HttpRepository {
    async fn fetch_readings(&self) -> Result<Vec<Reading>, FetchError> {
        let body = self.fetch_text(&self.endpoint(&self.readings_path)).await?;
        Ok(decode_readings(&body)?)
    }

    async fn fetch_forecast(&self, house_id: u64) -> Result<ForecastSet, FetchError> {
        let mut vars = HashMap::new();
        vars.insert("house_id".to_string(), house_id.to_string());
        let path = expand_template(&self.forecast_path, &vars);

        let body = self.fetch_text(&self.endpoint(&path)).await?;
        Ok(decode_forecast(&body, &self.channels)?)
    }

    async fn list_houses(&self) -> Result<Vec<House>, FetchError> {
        let body = self.fetch_text(&self.endpoint(&self.houses_path)).await?;
        Ok(decode_houses(&body)?)
    }
}
