//! Single-run cache of fetched conditions.
//!
//! Gaps that travel between the same two locations with departures in the
//! same time bucket share one pair of gateway calls. The cache lives for one
//! reconciliation run only, so nothing stale leaks into a later planning pass.
//!
//! The weather half of an entry is whatever the first gap with that key
//! requested: later gaps sharing the key reuse its window rather than
//! querying their own.

use std::collections::HashMap;

use chrono::{DateTime, Duration, DurationRound, Utc};

use crate::error::GatewayError;
use crate::timeline::TravelGap;
use crate::travel::{TrafficSnapshot, WeatherSnapshot};

/// Traffic and weather for one gap.
#[derive(Debug, Clone, PartialEq)]
pub struct GapConditions {
    pub traffic: TrafficSnapshot,
    pub weather: WeatherSnapshot,
}

/// Either both snapshots, or every failure that prevented getting them.
pub type FetchOutcome = Result<GapConditions, Vec<GatewayError>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConditionsKey {
    pub origin_ref: String,
    pub destination_ref: String,
    pub departure_bucket: DateTime<Utc>,
}

pub struct ConditionsCache {
    bucket: Duration,
    entries: HashMap<ConditionsKey, FetchOutcome>,
}

impl ConditionsCache {
    /// Create a cache rounding departures down to `bucket_minutes` (minimum 1).
    pub fn new(bucket_minutes: u32) -> Self {
        Self {
            bucket: Duration::minutes(bucket_minutes.max(1) as i64),
            entries: HashMap::new(),
        }
    }

    pub fn key_for(&self, gap: &TravelGap) -> ConditionsKey {
        let departure_bucket = gap
            .departure
            .duration_trunc(self.bucket)
            .unwrap_or(gap.departure);
        ConditionsKey {
            origin_ref: gap.origin_ref.clone(),
            destination_ref: gap.destination_ref.clone(),
            departure_bucket,
        }
    }

    pub fn get(&self, key: &ConditionsKey) -> Option<&FetchOutcome> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: ConditionsKey, outcome: FetchOutcome) {
        self.entries.insert(key, outcome);
    }
}
