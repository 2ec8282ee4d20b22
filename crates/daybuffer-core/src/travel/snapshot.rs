//! Traffic and weather snapshots returned by the gateways.
//!
//! Snapshots are ephemeral: they describe conditions for one query and are
//! only kept for the reconciliation run that fetched them.

use serde::{Deserialize, Serialize};

/// Congestion on a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CongestionLevel {
    Light,
    Moderate,
    Heavy,
    Severe,
}

/// How disruptive a traffic incident is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentSeverity {
    Minor,
    Major,
    Severe,
}

impl IncidentSeverity {
    /// Addition to the traffic multiplier for one incident of this severity.
    pub fn multiplier_penalty(&self) -> f64 {
        match self {
            IncidentSeverity::Minor => 0.1,
            IncidentSeverity::Major => 0.3,
            IncidentSeverity::Severe => 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficIncident {
    /// Free-form incident type as reported by the provider ("accident", "roadwork").
    #[serde(rename = "type")]
    pub incident_type: String,
    pub severity: IncidentSeverity,
    #[serde(default)]
    pub delay_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternateRoute {
    pub duration_minutes: u32,
    pub distance_km: f64,
    pub congestion: CongestionLevel,
}

/// Route conditions between two locations at a departure time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSnapshot {
    pub current_duration_minutes: u32,
    /// Non-congested duration of the same route.
    pub typical_duration_minutes: u32,
    pub congestion: CongestionLevel,
    #[serde(default)]
    pub incidents: Vec<TrafficIncident>,
    #[serde(default)]
    pub alternate_routes: Vec<AlternateRoute>,
}

impl TrafficSnapshot {
    /// Free-flowing traffic: current equals typical, no incidents.
    pub fn free_flow(minutes: u32) -> Self {
        Self {
            current_duration_minutes: minutes,
            typical_duration_minutes: minutes,
            congestion: CongestionLevel::Light,
            incidents: Vec::new(),
            alternate_routes: Vec::new(),
        }
    }

    /// Fastest alternate route, if the provider offered any.
    pub fn fastest_alternate(&self) -> Option<&AlternateRoute> {
        self.alternate_routes.iter().min_by_key(|r| r.duration_minutes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    Rain,
    Snow,
    Storm,
    Fog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherSeverity {
    Light,
    Moderate,
    Heavy,
}

/// Weather at a location over a time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub condition: WeatherCondition,
    pub severity: WeatherSeverity,
    pub visibility_miles: f64,
    #[serde(default)]
    pub wind_speed_mph: f64,
    #[serde(default)]
    pub precipitation_mm_per_hour: f64,
}

impl WeatherSnapshot {
    /// Clear skies with unlimited visibility.
    pub fn clear() -> Self {
        Self {
            condition: WeatherCondition::Clear,
            severity: WeatherSeverity::Light,
            visibility_miles: 10.0,
            wind_speed_mph: 0.0,
            precipitation_mm_per_hour: 0.0,
        }
    }
}
