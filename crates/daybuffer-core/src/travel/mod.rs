//! Travel conditions and the pure estimate calculator.

mod estimate;
mod snapshot;

pub use estimate::{
    base_weather_delay, confidence_score, estimate_travel, traffic_multiplier, EstimateSource,
    TravelEstimate, MALFORMED_CONFIDENCE_CAP, MAX_CONFIDENCE, MAX_TRAFFIC_MULTIPLIER,
    MIN_CONFIDENCE,
};
pub use snapshot::{
    AlternateRoute, CongestionLevel, IncidentSeverity, TrafficIncident, TrafficSnapshot,
    WeatherCondition, WeatherSeverity, WeatherSnapshot,
};
