//! Timeline reconciliation against live traffic and weather.
//!
//! A run has two phases:
//! 1. Prefetch: every distinct travel gap is fetched, both gateways at once
//!    per gap, up to `max_concurrent_gaps` gaps in flight.
//! 2. Fold: estimates are computed and shifts applied strictly in gap order.
//!
//! Gateway failures never abort a run; the affected gap gets the fallback
//! estimate and a diagnostic record. Only invalid input is reported as an
//! error.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::Duration;
use futures::stream::{self, StreamExt};
use uuid::Uuid;

use super::cascade::{apply_shifts, whole_minutes};
use super::report::{FallbackRecord, GapEstimate, Reconciliation};
use crate::error::{GatewayError, Result, ValidationError};
use crate::gateway::{
    ConditionsCache, FetchOutcome, GapConditions, RetryPolicy, TimeWindow, TrafficGateway,
    WeatherGateway,
};
use crate::storage::EngineConfig;
use crate::timeline::{detect_travel_gaps, validate_timeline, LocationDescriptor, ScheduleEvent, TravelGap};
use crate::travel::{estimate_travel, TravelEstimate};

/// Shortest weather window requested for a gap.
const MIN_WEATHER_WINDOW_MINUTES: i64 = 60;

pub struct Reconciler {
    traffic: Arc<dyn TrafficGateway>,
    weather: Arc<dyn WeatherGateway>,
    retry: RetryPolicy,
    max_concurrent_gaps: usize,
    cache_bucket_minutes: u32,
    default_location: Option<LocationDescriptor>,
}

impl Reconciler {
    /// Create a reconciler with default retry, concurrency and cache settings.
    pub fn new(traffic: Arc<dyn TrafficGateway>, weather: Arc<dyn WeatherGateway>) -> Self {
        Self::from_config(&EngineConfig::default(), traffic, weather)
    }

    pub fn from_config(
        config: &EngineConfig,
        traffic: Arc<dyn TrafficGateway>,
        weather: Arc<dyn WeatherGateway>,
    ) -> Self {
        Self {
            traffic,
            weather,
            retry: RetryPolicy::from_settings(&config.gateway),
            max_concurrent_gaps: config.gateway.max_concurrent_gaps.max(1),
            cache_bucket_minutes: config.cache.departure_bucket_minutes,
            default_location: None,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_concurrent_gaps(mut self, limit: usize) -> Self {
        self.max_concurrent_gaps = limit.max(1);
        self
    }

    /// Location used for events whose reference is missing from the map.
    pub fn with_default_location(mut self, location: LocationDescriptor) -> Self {
        self.default_location = Some(location);
        self
    }

    fn location<'a>(
        &'a self,
        locations: &'a HashMap<String, LocationDescriptor>,
        location_ref: &str,
    ) -> Option<&'a LocationDescriptor> {
        locations
            .get(location_ref)
            .or(self.default_location.as_ref())
    }

    /// Descriptor for `location_ref`, if it resolves and has coordinates.
    fn queryable<'a>(
        &'a self,
        locations: &'a HashMap<String, LocationDescriptor>,
        location_ref: &str,
    ) -> std::result::Result<&'a LocationDescriptor, GatewayError> {
        self.location(locations, location_ref)
            .filter(|location| location.coordinates.is_some())
            .ok_or_else(|| GatewayError::MalformedLocation {
                location: location_ref.to_string(),
            })
    }

    fn check_locations(
        &self,
        events: &[ScheduleEvent],
        locations: &HashMap<String, LocationDescriptor>,
    ) -> std::result::Result<(), ValidationError> {
        match events
            .iter()
            .find(|e| self.location(locations, &e.location_ref).is_none())
        {
            Some(event) => Err(ValidationError::MissingLocation {
                event_id: event.id.clone(),
                location_ref: event.location_ref.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Reconcile a timeline, returning the adjusted copy and per-gap estimates.
    ///
    /// The input is not modified, so a run can be retried or discarded freely.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty or unordered timeline, an
    /// event with `start >= end`, or an event whose location is unresolved
    /// while no default location is set.
    pub async fn reconcile(
        &self,
        events: &[ScheduleEvent],
        locations: &HashMap<String, LocationDescriptor>,
    ) -> Result<Reconciliation> {
        validate_timeline(events)?;
        self.check_locations(events, locations)?;

        let run_id = Uuid::new_v4();
        let gaps = detect_travel_gaps(events);
        tracing::info!(%run_id, events = events.len(), gaps = gaps.len(), "reconciling timeline");

        let cache = self.prefetch(&gaps, locations).await;

        let mut estimates = BTreeMap::new();
        let mut alternates = HashMap::new();
        let mut diagnostics = Vec::new();
        for gap in &gaps {
            let kind = events[gap.index + 1].kind;
            let estimate = match cache.get(&cache.key_for(gap)) {
                Some(Ok(conditions)) => {
                    if let Some(route) = conditions.traffic.fastest_alternate() {
                        alternates.insert(gap.index, route.clone());
                    }
                    estimate_travel(&conditions.traffic, &conditions.weather, kind)
                }
                Some(Err(errors)) => {
                    diagnostics.push(fallback_record(gap, errors));
                    TravelEstimate::fallback()
                }
                None => {
                    diagnostics.push(FallbackRecord {
                        gap_index: gap.index,
                        from_event_id: gap.from_event_id.clone(),
                        to_event_id: gap.to_event_id.clone(),
                        reasons: vec!["conditions were not fetched".into()],
                    });
                    TravelEstimate::fallback()
                }
            };
            tracing::debug!(
                gap = gap.index,
                from = %gap.from_event_id,
                to = %gap.to_event_id,
                buffer = estimate.total_buffer_minutes,
                confidence = estimate.confidence,
                fallback = estimate.is_fallback(),
                "gap estimate"
            );
            estimates.insert(gap.index, estimate);
        }

        let outcome = apply_shifts(events, &estimates);

        let shifted_event_ids: Vec<String> = outcome
            .events
            .iter()
            .zip(&outcome.delays)
            .filter(|(_, delay)| **delay > Duration::zero())
            .map(|(event, _)| event.id.clone())
            .collect();

        let estimates: Vec<GapEstimate> = gaps
            .iter()
            .filter_map(|gap| {
                estimates.remove(&gap.index).map(|estimate| GapEstimate {
                    gap_index: gap.index,
                    from_event_id: gap.from_event_id.clone(),
                    to_event_id: gap.to_event_id.clone(),
                    estimate,
                    shift_minutes: whole_minutes(outcome.delays[gap.index + 1]),
                    alternate_route: alternates.remove(&gap.index),
                })
            })
            .collect();

        tracing::info!(
            %run_id,
            shifted = shifted_event_ids.len(),
            fallbacks = diagnostics.len(),
            "reconciliation complete"
        );

        Ok(Reconciliation {
            run_id,
            events: outcome.events,
            estimates,
            diagnostics,
            shifted_event_ids,
        })
    }

    /// Fetch conditions for every distinct gap key, bounded by the worker limit.
    async fn prefetch(
        &self,
        gaps: &[TravelGap],
        locations: &HashMap<String, LocationDescriptor>,
    ) -> ConditionsCache {
        let mut cache = ConditionsCache::new(self.cache_bucket_minutes);

        let mut seen = HashSet::new();
        let pending: Vec<&TravelGap> = gaps
            .iter()
            .filter(|gap| seen.insert(cache.key_for(gap)))
            .collect();

        let fetched: Vec<_> = stream::iter(pending)
            .map(|gap| async move {
                let outcome = self.fetch_conditions(gap, locations).await;
                (gap, outcome)
            })
            .buffer_unordered(self.max_concurrent_gaps)
            .collect()
            .await;

        for (gap, outcome) in fetched {
            if let Err(errors) = &outcome {
                for error in errors {
                    tracing::warn!(gap = gap.index, %error, "using fallback estimate");
                }
            }
            let key = cache.key_for(gap);
            cache.insert(key, outcome);
        }

        cache
    }

    async fn fetch_conditions(
        &self,
        gap: &TravelGap,
        locations: &HashMap<String, LocationDescriptor>,
    ) -> FetchOutcome {
        let (origin, destination) = match (
            self.queryable(locations, &gap.origin_ref),
            self.queryable(locations, &gap.destination_ref),
        ) {
            (Ok(origin), Ok(destination)) => (origin, destination),
            (origin, destination) => {
                return Err(origin.err().into_iter().chain(destination.err()).collect())
            }
        };

        let window = TimeWindow::new(
            gap.departure,
            gap.arrival
                .max(gap.departure + Duration::minutes(MIN_WEATHER_WINDOW_MINUTES)),
        );

        let (traffic, weather) = tokio::join!(
            self.retry.run(self.traffic.name(), || {
                self.traffic.get_traffic(origin, destination, gap.departure)
            }),
            self.retry.run(self.weather.name(), || {
                self.weather.get_weather(destination, window)
            }),
        );

        match (traffic, weather) {
            (Ok(traffic), Ok(weather)) => Ok(GapConditions { traffic, weather }),
            (traffic, weather) => Err(traffic.err().into_iter().chain(weather.err()).collect()),
        }
    }
}

fn fallback_record(gap: &TravelGap, errors: &[GatewayError]) -> FallbackRecord {
    FallbackRecord {
        gap_index: gap.index,
        from_event_id: gap.from_event_id.clone(),
        to_event_id: gap.to_event_id.clone(),
        reasons: errors.iter().map(|e| e.to_string()).collect(),
    }
}
