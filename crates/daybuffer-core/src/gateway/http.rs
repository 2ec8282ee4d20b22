//! HTTP gateways that fetch snapshots as JSON from configured endpoints.
//!
//! The endpoints are expected to answer with the snapshot shape directly
//! (see [`TrafficSnapshot`] and [`WeatherSnapshot`]); adapting a specific
//! provider's wire format is the job of whatever sits behind the endpoint.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use super::traits::{TimeWindow, TrafficGateway, WeatherGateway};
use crate::error::GatewayError;
use crate::storage::EndpointConfig;
use crate::timeline::{GeoPoint, LocationDescriptor};
use crate::travel::{TrafficSnapshot, WeatherSnapshot};

/// Shared request plumbing for both gateways.
struct JsonEndpoint {
    service: &'static str,
    endpoint: String,
    api_key: Option<String>,
    http_client: Client,
}

impl JsonEndpoint {
    fn new(service: &'static str, config: &EndpointConfig, http_client: Client) -> Self {
        Self {
            service,
            endpoint: config.endpoint.trim().to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            http_client,
        }
    }

    fn unavailable(&self, message: impl Into<String>) -> GatewayError {
        GatewayError::Unavailable {
            service: self.service.to_string(),
            message: message.into(),
        }
    }

    fn url(&self, query: &[(&str, String)]) -> Result<Url, GatewayError> {
        if self.endpoint.is_empty() {
            return Err(self.unavailable("endpoint not configured"));
        }
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| self.unavailable(format!("invalid endpoint: {e}")))?;
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(&self, query: &[(&str, String)]) -> Result<T, GatewayError> {
        let url = self.url(query)?;

        let mut request = self.http_client.get(url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request.send().await.map_err(|e| self.map_transport(e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(self.unavailable(format!("HTTP {status}: {text}")));
        }

        let body = resp.bytes().await.map_err(|e| self.map_transport(e))?;
        serde_json::from_slice(&body).map_err(|e| GatewayError::MalformedSnapshot {
            service: self.service.to_string(),
            message: e.to_string(),
        })
    }

    // Deadlines are enforced by the retry policy, so every transport error
    // counts as unavailability.
    fn map_transport(&self, err: reqwest::Error) -> GatewayError {
        self.unavailable(err.to_string())
    }
}

fn coordinates(location: &LocationDescriptor) -> Result<GeoPoint, GatewayError> {
    location
        .coordinates
        .ok_or_else(|| GatewayError::MalformedLocation {
            location: location.address.clone(),
        })
}

fn rfc3339(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Traffic gateway backed by an HTTP JSON endpoint.
pub struct HttpTrafficGateway {
    inner: JsonEndpoint,
}

impl HttpTrafficGateway {
    pub fn new(config: &EndpointConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Share an existing connection pool.
    pub fn with_client(config: &EndpointConfig, http_client: Client) -> Self {
        Self {
            inner: JsonEndpoint::new("traffic", config, http_client),
        }
    }
}

#[async_trait]
impl TrafficGateway for HttpTrafficGateway {
    fn name(&self) -> &str {
        self.inner.service
    }

    async fn get_traffic(
        &self,
        origin: &LocationDescriptor,
        destination: &LocationDescriptor,
        departure: DateTime<Utc>,
    ) -> Result<TrafficSnapshot, GatewayError> {
        let from = coordinates(origin)?;
        let to = coordinates(destination)?;

        self.inner
            .fetch(&[
                ("origin", format!("{},{}", from.lat, from.lng)),
                ("destination", format!("{},{}", to.lat, to.lng)),
                ("departure", rfc3339(departure)),
            ])
            .await
    }
}

/// Weather gateway backed by an HTTP JSON endpoint.
pub struct HttpWeatherGateway {
    inner: JsonEndpoint,
}

impl HttpWeatherGateway {
    pub fn new(config: &EndpointConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: &EndpointConfig, http_client: Client) -> Self {
        Self {
            inner: JsonEndpoint::new("weather", config, http_client),
        }
    }
}

#[async_trait]
impl WeatherGateway for HttpWeatherGateway {
    fn name(&self) -> &str {
        self.inner.service
    }

    async fn get_weather(
        &self,
        location: &LocationDescriptor,
        window: TimeWindow,
    ) -> Result<WeatherSnapshot, GatewayError> {
        let point = coordinates(location)?;

        self.inner
            .fetch(&[
                ("location", format!("{},{}", point.lat, point.lng)),
                ("from", rfc3339(window.start)),
                ("to", rfc3339(window.end)),
            ])
            .await
    }
}
