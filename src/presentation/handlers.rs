// HTTP request handlers
use crate::application::chart_service::ChartError;
use crate::infrastructure::json_mapper::{HouseDto, charts_to_json, house_to_json};
use crate::presentation::app_state::AppState;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub past_weeks: Option<u32>,
    pub future_weeks: Option<u32>,
}

impl IntoResponse for ChartError {
    fn into_response(self) -> Response {
        let status = match self {
            ChartError::ReadingsUnavailable(_) => StatusCode::BAD_GATEWAY,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/houses", get(list_houses))
        .route("/houses/:id/charts", get(house_charts))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List all houses
pub async fn list_houses(State(state): State<Arc<AppState>>) -> Json<Vec<HouseDto>> {
    match state.house_service.list_houses().await {
        Ok(houses) => Json(houses.into_iter().map(house_to_json).collect()),
        Err(e) => {
            tracing::error!("Error fetching houses: {}", e);
            // Return empty list on error
            Json(Vec::new())
        }
    }
}

/// Weekly history and forecast charts for one house
pub async fn house_charts(
    Path(id): Path<u64>,
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ChartError> {
    let past_weeks = query.past_weeks.unwrap_or(state.default_past_weeks);
    let future_weeks = query.future_weeks.unwrap_or(state.default_future_weeks);

    let charts = state
        .chart_service
        .build(id, past_weeks, future_weeks, chrono::Utc::now())
        .await
        .inspect_err(|e| tracing::error!("Error building charts for house {}: {}", id, e))?;

    Ok(Json(charts_to_json(charts)).into_response())
}
