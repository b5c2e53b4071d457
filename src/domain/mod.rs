// Domain layer - Pure models and weekly series computations
pub mod aggregator;
pub mod channel;
pub mod chart;
pub mod composer;
pub mod extrapolator;
pub mod house;
pub mod reading;
