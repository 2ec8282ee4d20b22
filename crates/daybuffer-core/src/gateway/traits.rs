use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::timeline::LocationDescriptor;
use crate::travel::{TrafficSnapshot, WeatherSnapshot};

/// Time range a weather query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Window from `start` to `end`, widened to zero length if `end` is earlier.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }
}

/// Route conditions provider. Clients may be shared across concurrent lookups.
#[async_trait]
pub trait TrafficGateway: Send + Sync {
    /// Unique identifier used in logs and diagnostics (e.g. "traffic").
    fn name(&self) -> &str;

    async fn get_traffic(
        &self,
        origin: &LocationDescriptor,
        destination: &LocationDescriptor,
        departure: DateTime<Utc>,
    ) -> Result<TrafficSnapshot, GatewayError>;
}

/// Weather conditions provider.
#[async_trait]
pub trait WeatherGateway: Send + Sync {
    fn name(&self) -> &str;

    async fn get_weather(
        &self,
        location: &LocationDescriptor,
        window: TimeWindow,
    ) -> Result<WeatherSnapshot, GatewayError>;
}
