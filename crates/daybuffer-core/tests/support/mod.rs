//! Scripted gateways and fixtures shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use daybuffer_core::gateway::{RetryPolicy, TimeWindow, TrafficGateway, WeatherGateway};
use daybuffer_core::{
    EventKind, GatewayError, LocationCategory, LocationDescriptor, Reconciler, ScheduleEvent,
    TrafficSnapshot, WeatherSnapshot,
};

/// Tracks how many calls are in flight and the highest count seen.
#[derive(Default)]
pub struct Gauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl Gauge {
    pub fn enter(self: &Arc<Self>) -> GaugeGuard {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        GaugeGuard(Arc::clone(self))
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

pub struct GaugeGuard(Arc<Gauge>);

impl Drop for GaugeGuard {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// How a scripted gateway answers.
#[derive(Clone)]
pub enum Script<T> {
    Answer(T),
    /// Answers after the given delay.
    Slow(T, StdDuration),
    Fail(GatewayError),
    /// Never answers within any reasonable timeout.
    Hang,
}

pub struct ScriptedTraffic {
    default: Script<TrafficSnapshot>,
    routes: HashMap<(String, String), Script<TrafficSnapshot>>,
    gauge: Option<Arc<Gauge>>,
    pub calls: AtomicUsize,
    /// Routes in the order their calls finished.
    pub finished: Mutex<Vec<(String, String)>>,
}

impl ScriptedTraffic {
    pub fn new(default: Script<TrafficSnapshot>) -> Self {
        Self {
            default,
            routes: HashMap::new(),
            gauge: None,
            calls: AtomicUsize::new(0),
            finished: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(snapshot: TrafficSnapshot) -> Self {
        Self::new(Script::Answer(snapshot))
    }

    /// Script a specific origin/destination address pair.
    pub fn route(mut self, origin: &str, destination: &str, script: Script<TrafficSnapshot>) -> Self {
        self.routes
            .insert((origin.to_string(), destination.to_string()), script);
        self
    }

    pub fn gauged(mut self, gauge: Arc<Gauge>) -> Self {
        self.gauge = Some(gauge);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrafficGateway for ScriptedTraffic {
    fn name(&self) -> &str {
        "traffic"
    }

    async fn get_traffic(
        &self,
        origin: &LocationDescriptor,
        destination: &LocationDescriptor,
        _departure: DateTime<Utc>,
    ) -> Result<TrafficSnapshot, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _in_flight = self.gauge.as_ref().map(|g| g.enter());
        let route = (origin.address.clone(), destination.address.clone());
        let script = self.routes.get(&route).unwrap_or(&self.default).clone();
        let outcome = play(script).await;
        self.finished.lock().unwrap().push(route);
        outcome
    }
}

pub struct ScriptedWeather {
    default: Script<WeatherSnapshot>,
    places: HashMap<String, Script<WeatherSnapshot>>,
    gauge: Option<Arc<Gauge>>,
    pub calls: AtomicUsize,
    /// Every (address, window) requested, in call order.
    pub requests: Mutex<Vec<(String, TimeWindow)>>,
}

impl ScriptedWeather {
    pub fn new(default: Script<WeatherSnapshot>) -> Self {
        Self {
            default,
            places: HashMap::new(),
            gauge: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(snapshot: WeatherSnapshot) -> Self {
        Self::new(Script::Answer(snapshot))
    }

    pub fn place(mut self, address: &str, script: Script<WeatherSnapshot>) -> Self {
        self.places.insert(address.to_string(), script);
        self
    }

    pub fn gauged(mut self, gauge: Arc<Gauge>) -> Self {
        self.gauge = Some(gauge);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherGateway for ScriptedWeather {
    fn name(&self) -> &str {
        "weather"
    }

    async fn get_weather(
        &self,
        location: &LocationDescriptor,
        window: TimeWindow,
    ) -> Result<WeatherSnapshot, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((location.address.clone(), window));
        let _in_flight = self.gauge.as_ref().map(|g| g.enter());
        let script = self
            .places
            .get(&location.address)
            .unwrap_or(&self.default)
            .clone();
        play(script).await
    }
}

async fn play<T>(script: Script<T>) -> Result<T, GatewayError> {
    match script {
        Script::Answer(value) => Ok(value),
        Script::Slow(value, delay) => {
            tokio::time::sleep(delay).await;
            Ok(value)
        }
        Script::Fail(err) => Err(err),
        Script::Hang => {
            tokio::time::sleep(StdDuration::from_secs(3600)).await;
            Err(GatewayError::Unavailable {
                service: "scripted".into(),
                message: "hung".into(),
            })
        }
    }
}

pub fn unavailable(service: &str) -> GatewayError {
    GatewayError::Unavailable {
        service: service.into(),
        message: "HTTP 503".into(),
    }
}

/// Short deadlines so timeouts resolve quickly under a paused clock.
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        timeout: StdDuration::from_millis(200),
        max_retries: 2,
        initial_backoff: StdDuration::from_millis(10),
        max_backoff: StdDuration::from_millis(40),
    }
}

pub fn reconciler(traffic: Arc<ScriptedTraffic>, weather: Arc<ScriptedWeather>) -> Reconciler {
    Reconciler::new(traffic, weather).with_retry_policy(fast_policy())
}

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 20, hour, minute, 0).unwrap()
}

pub fn event(
    id: &str,
    kind: EventKind,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    location: &str,
) -> ScheduleEvent {
    ScheduleEvent::new(id, format!("Event {id}"), kind, start, end, location)
}

/// Locations keyed by ref; each address equals its ref.
pub fn locations(refs: &[&str]) -> HashMap<String, LocationDescriptor> {
    refs.iter()
        .enumerate()
        .map(|(i, r)| {
            (
                r.to_string(),
                LocationDescriptor::new(*r, 40.0 + i as f64 * 0.01, -74.0, LocationCategory::Venue),
            )
        })
        .collect()
}
