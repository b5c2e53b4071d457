// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use house_telemetry::application::chart_service::ChartService;
use house_telemetry::application::house_service::HouseService;
use house_telemetry::infrastructure::config::{load_channels_config, load_service_config};
use house_telemetry::infrastructure::http_repository::HttpRepository;
use house_telemetry::presentation::app_state::AppState;
use house_telemetry::presentation::handlers::router;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let service_config = load_service_config()?;
    let channels_config = load_channels_config()?;
    let channels = channels_config.channel_table();

    // Create repository (infrastructure layer)
    let repository = Arc::new(HttpRepository::new(&service_config.upstream, channels.clone())?);

    // Create services (application layer)
    let house_service = HouseService::new(repository.clone());
    let chart_service = ChartService::new(repository, channels, channels_config.chart_layout());

    // Create application state
    let state = Arc::new(AppState {
        house_service,
        chart_service,
        default_past_weeks: service_config.server.default_past_weeks,
        default_future_weeks: service_config.server.default_future_weeks,
    });

    // Start server
    let addr: SocketAddr = service_config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", service_config.server.bind))?;
    tracing::info!("Starting house-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router(state)).await?;

    Ok(())
}
