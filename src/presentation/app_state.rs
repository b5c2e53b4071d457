// Application state for HTTP handlers
use crate::application::chart_service::ChartService;
use crate::application::house_service::HouseService;

#[derive(Clone)]
pub struct AppState {
    pub house_service: HouseService,
    pub chart_service: ChartService,
    pub default_past_weeks: u32,
    pub default_future_weeks: u32,
}
