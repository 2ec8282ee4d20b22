//! Traffic and weather gateways.
//!
//! Gateways are injected into the reconciler as trait objects so tests can
//! script their answers. The HTTP implementations talk to configured JSON
//! endpoints; every call goes through a [`RetryPolicy`].

pub mod cache;
pub mod http;
pub mod retry;
pub mod traits;

pub use cache::{ConditionsCache, ConditionsKey, FetchOutcome, GapConditions};
pub use http::{HttpTrafficGateway, HttpWeatherGateway};
pub use retry::RetryPolicy;
pub use traits::{TimeWindow, TrafficGateway, WeatherGateway};
