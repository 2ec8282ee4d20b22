//! Core error types for daybuffer-core.
//!
//! Gateway failures are recovered inside the reconciler and only show up as
//! diagnostics. Validation failures are surfaced to the caller, who has to
//! fix the input before re-invoking.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Core error type for daybuffer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid timeline input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Traffic or weather provider failure
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Timeline store failure reported by a collaborator
    #[error("Timeline store error: {message}")]
    Store { message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Failures of the traffic and weather providers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// The call did not finish within its deadline
    #[error("{service} gateway timed out after {timeout_ms}ms")]
    Timeout { service: String, timeout_ms: u64 },

    /// Network failure, quota rejection or non-2xx response
    #[error("{service} gateway unavailable: {message}")]
    Unavailable { service: String, message: String },

    /// The location cannot be queried (no coordinates, or no descriptor)
    ///
    /// `location` is the location ref when the reconciler detects the
    /// problem, or the address when an adapter only sees the descriptor.
    #[error("Location '{location}' has no coordinates")]
    MalformedLocation { location: String },

    /// The provider answered with data that does not decode into a snapshot
    #[error("{service} gateway returned a malformed snapshot: {message}")]
    MalformedSnapshot { service: String, message: String },
}

impl GatewayError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::Timeout { .. } | GatewayError::Unavailable { .. }
        )
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors for timeline input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Invalid time range
    #[error("Invalid time range for event '{event_id}': end ({end}) must be after start ({start})")]
    InvalidTimeRange {
        event_id: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Events not in non-decreasing start order
    #[error("Timeline out of order at index {index}: {current} starts before {previous}")]
    Unordered {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    /// Event location could not be resolved and no default exists
    #[error("Event '{event_id}' references unresolved location '{location_ref}'")]
    MissingLocation {
        event_id: String,
        location_ref: String,
    },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
