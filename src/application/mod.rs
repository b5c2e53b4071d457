// Application layer - Use cases over the telemetry repository
pub mod chart_service;
pub mod house_service;
pub mod telemetry_repository;
