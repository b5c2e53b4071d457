// House service - Use case for listing houses
use crate::application::telemetry_repository::{FetchError, TelemetryRepository};
use crate::domain::house::House;
use std::sync::Arc;

#[derive(Clone)]
pub struct HouseService {
    repository: Arc<dyn TelemetryRepository>,
}

impl HouseService {
    pub fn new(repository: Arc<dyn TelemetryRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_houses(&self) -> Result<Vec<House>, FetchError> {
        let mut houses = self.repository.list_houses().await?;
        houses.sort_by_key(|h| h.id);
        Ok(houses)
    }
}
