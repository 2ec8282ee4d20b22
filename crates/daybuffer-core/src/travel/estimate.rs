//! Travel estimate calculation.
//!
//! Combines one traffic snapshot and one weather snapshot with the kind of
//! the event being travelled to into a buffer and a confidence score. The
//! calculation is pure and never fails: malformed input lowers confidence
//! instead of aborting.

use serde::{Deserialize, Serialize};

use super::snapshot::{
    CongestionLevel, TrafficSnapshot, WeatherCondition, WeatherSeverity, WeatherSnapshot,
};
use crate::timeline::EventKind;

/// Upper bound of the traffic multiplier.
pub const MAX_TRAFFIC_MULTIPLIER: f64 = 3.0;

/// Lowest confidence an estimate can carry.
pub const MIN_CONFIDENCE: u8 = 20;

/// Highest confidence an estimate can carry.
pub const MAX_CONFIDENCE: u8 = 100;

/// Confidence ceiling when the traffic snapshot had no typical duration.
pub const MALFORMED_CONFIDENCE_CAP: u8 = 50;

/// Substitute typical duration when the provider reported zero.
const MIN_TYPICAL_DURATION_MINUTES: u32 = 1;

/// Where an estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateSource {
    /// Computed from live gateway data
    Live,
    /// Fixed conservative estimate used when live data was unavailable
    Fallback,
}

/// Travel time that must be reserved for one gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelEstimate {
    pub base_duration_minutes: u32,
    pub traffic_multiplier: f64,
    pub weather_delay_minutes: f64,
    pub total_buffer_minutes: u32,
    /// 20..=100
    pub confidence: u8,
    pub source: EstimateSource,
}

impl TravelEstimate {
    /// The conservative estimate substituted when gateways fail.
    pub fn fallback() -> Self {
        Self {
            base_duration_minutes: 30,
            traffic_multiplier: 1.5,
            weather_delay_minutes: 15.0,
            total_buffer_minutes: 60,
            confidence: 50,
            source: EstimateSource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == EstimateSource::Fallback
    }
}

/// Weather delay in minutes before the event-kind weighting.
pub fn base_weather_delay(condition: WeatherCondition, severity: WeatherSeverity) -> f64 {
    use WeatherSeverity::*;

    match (condition, severity) {
        (WeatherCondition::Clear, _) => 0.0,
        (WeatherCondition::Storm, _) => 45.0,
        (WeatherCondition::Rain, Light) => 5.0,
        (WeatherCondition::Rain, Moderate) => 15.0,
        (WeatherCondition::Rain, Heavy) => 30.0,
        (WeatherCondition::Snow, Light) => 15.0,
        (WeatherCondition::Snow, Moderate) => 30.0,
        (WeatherCondition::Snow, Heavy) => 60.0,
        (WeatherCondition::Fog, Light) => 10.0,
        (WeatherCondition::Fog, Moderate) => 20.0,
        (WeatherCondition::Fog, Heavy) => 40.0,
    }
}

/// Ratio of current to typical duration plus incident penalties, capped at 3.0.
pub fn traffic_multiplier(traffic: &TrafficSnapshot) -> f64 {
    let typical = traffic
        .typical_duration_minutes
        .max(MIN_TYPICAL_DURATION_MINUTES) as f64;
    let incident_penalty: f64 = traffic
        .incidents
        .iter()
        .map(|incident| incident.severity.multiplier_penalty())
        .sum();

    (traffic.current_duration_minutes as f64 / typical + incident_penalty)
        .min(MAX_TRAFFIC_MULTIPLIER)
}

fn congestion_penalty(level: CongestionLevel) -> i32 {
    match level {
        CongestionLevel::Severe => 30,
        CongestionLevel::Heavy => 20,
        CongestionLevel::Moderate => 10,
        CongestionLevel::Light => 0,
    }
}

fn weather_penalty(weather: &WeatherSnapshot) -> i32 {
    match (weather.condition, weather.severity) {
        (WeatherCondition::Storm, _) => 40,
        (WeatherCondition::Clear, _) => 0,
        (_, WeatherSeverity::Heavy) => 25,
        (_, WeatherSeverity::Moderate) => 15,
        (_, WeatherSeverity::Light) => 0,
    }
}

fn visibility_penalty(visibility_miles: f64) -> i32 {
    if visibility_miles < 1.0 {
        30
    } else if visibility_miles < 3.0 {
        20
    } else {
        0
    }
}

/// Confidence score for a pair of snapshots, in `[20, 100]`.
pub fn confidence_score(traffic: &TrafficSnapshot, weather: &WeatherSnapshot) -> u8 {
    let mut confidence = MAX_CONFIDENCE as i32
        - congestion_penalty(traffic.congestion)
        - weather_penalty(weather)
        - visibility_penalty(weather.visibility_miles);

    if traffic.typical_duration_minutes == 0 {
        confidence = confidence.min(MALFORMED_CONFIDENCE_CAP as i32);
    }

    confidence.clamp(MIN_CONFIDENCE as i32, MAX_CONFIDENCE as i32) as u8
}

/// Compute the travel estimate for reaching an event of `kind`.
pub fn estimate_travel(
    traffic: &TrafficSnapshot,
    weather: &WeatherSnapshot,
    kind: EventKind,
) -> TravelEstimate {
    let base = traffic
        .typical_duration_minutes
        .max(MIN_TYPICAL_DURATION_MINUTES);
    let multiplier = traffic_multiplier(traffic);
    let weather_delay =
        base_weather_delay(weather.condition, weather.severity) * kind.weather_multiplier();
    let event_buffer = kind.minimum_buffer_minutes() as f64;

    let total = (base as f64 * multiplier + weather_delay + event_buffer).round();

    TravelEstimate {
        base_duration_minutes: base,
        traffic_multiplier: multiplier,
        weather_delay_minutes: weather_delay,
        total_buffer_minutes: total.max(0.0) as u32,
        confidence: confidence_score(traffic, weather),
        source: EstimateSource::Live,
    }
}
