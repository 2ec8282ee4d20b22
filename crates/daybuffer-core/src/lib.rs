//! # daybuffer Core Library
//!
//! Travel-buffer estimation and timeline reconciliation for day-of event
//! schedules. Given an ordered sequence of activities at different
//! locations, the engine works out how much travel time must separate
//! consecutive activities under live traffic and weather, pushes later
//! activities back when a buffer does not fit, and raises operator alerts.
//!
//! ## Architecture
//!
//! - **Calculator**: pure function turning a traffic snapshot, a weather
//!   snapshot and the destination event kind into a buffer and a confidence
//! - **Gateways**: injected traffic/weather providers with timeouts, bounded
//!   retries and a single-run cache
//! - **Reconciler**: prefetches gap conditions concurrently, then applies
//!   shifts strictly in timeline order
//! - **Alerts**: thresholds over the final estimates
//!
//! ## Key Components
//!
//! - [`estimate_travel`]: The travel estimate calculator
//! - [`Reconciler`]: Timeline reconciliation entry point
//! - [`generate_alerts`]: Alert derivation
//! - [`EngineConfig`]: Engine configuration management

pub mod alerts;
pub mod error;
pub mod gateway;
pub mod reconcile;
pub mod session;
pub mod storage;
pub mod timeline;
pub mod travel;

pub use alerts::{generate_alerts, Alert, AlertGenerator, AlertThresholds, AlertTier};
pub use error::{ConfigError, CoreError, GatewayError, ValidationError};
pub use gateway::{HttpTrafficGateway, HttpWeatherGateway, RetryPolicy, TimeWindow, TrafficGateway, WeatherGateway};
pub use reconcile::{FallbackRecord, GapEstimate, Reconciler, Reconciliation};
pub use session::{plan_session, LocationDirectory, NotificationSink, SessionOutcome, TimelineStore};
pub use storage::EngineConfig;
pub use timeline::{EventKind, LocationCategory, LocationDescriptor, Priority, Provenance, ScheduleEvent};
pub use travel::{estimate_travel, TrafficSnapshot, TravelEstimate, WeatherSnapshot};
