// Weekly history and forecast charts for house water and heat detectors
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
