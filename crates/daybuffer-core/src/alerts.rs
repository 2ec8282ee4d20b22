//! Operator alerts derived from reconciliation estimates.
//!
//! Per gap, at most one buffer alert (critical above the critical threshold,
//! warning above the warning threshold) plus one confidence alert when the
//! estimate is not trustworthy. Tight, trustworthy buffers produce nothing.

use serde::{Deserialize, Serialize};

use crate::reconcile::GapEstimate;
use crate::storage::AlertConfig;
use crate::timeline::ScheduleEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertTier {
    /// Not raised by [`AlertGenerator`]; kept so alert feeds from other
    /// producers deserialize.
    Info,
    Warning,
    Critical,
}

/// An operator-facing alert about one gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// The event being travelled to.
    pub event_id: String,
    pub gap_index: usize,
    pub tier: AlertTier,
    pub message: String,
    pub recommendation: String,
    pub buffer_minutes: u32,
    pub confidence: u8,
    /// The estimate behind this alert is the conservative fallback.
    pub fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Buffers strictly above this are critical.
    pub critical_buffer_minutes: u32,
    /// Buffers strictly above this (and not critical) are warnings.
    pub warning_buffer_minutes: u32,
    /// Confidence strictly below this raises a warning.
    pub min_confidence: u8,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self::from(&AlertConfig::default())
    }
}

impl From<&AlertConfig> for AlertThresholds {
    fn from(config: &AlertConfig) -> Self {
        Self {
            critical_buffer_minutes: config.critical_buffer_minutes,
            warning_buffer_minutes: config.warning_buffer_minutes,
            min_confidence: config.min_confidence,
        }
    }
}

pub struct AlertGenerator {
    thresholds: AlertThresholds,
}

impl AlertGenerator {
    pub fn new() -> Self {
        Self {
            thresholds: AlertThresholds::default(),
        }
    }

    pub fn with_thresholds(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    /// Evaluate every gap estimate, in gap order.
    pub fn generate(&self, events: &[ScheduleEvent], estimates: &[GapEstimate]) -> Vec<Alert> {
        let mut alerts = Vec::new();

        for gap in estimates {
            let estimate = &gap.estimate;
            let buffer = estimate.total_buffer_minutes;
            let title = events
                .iter()
                .find(|e| e.id == gap.to_event_id)
                .map(|e| e.title.as_str())
                .unwrap_or(gap.to_event_id.as_str());
            let source = if estimate.is_fallback() {
                " (fallback estimate)"
            } else {
                ""
            };

            let alert = |tier, message: String, recommendation: &str| Alert {
                event_id: gap.to_event_id.clone(),
                gap_index: gap.gap_index,
                tier,
                message,
                recommendation: recommendation.to_string(),
                buffer_minutes: buffer,
                confidence: estimate.confidence,
                fallback: estimate.is_fallback(),
            };

            if buffer > self.thresholds.critical_buffer_minutes {
                let recommendation = match &gap.alternate_route {
                    Some(route) => format!(
                        "Reschedule the event or take the alternate route ({} min, {:.1} km)",
                        route.duration_minutes, route.distance_km
                    ),
                    None => "Reschedule the event or choose an alternate route".to_string(),
                };
                alerts.push(alert(
                    AlertTier::Critical,
                    format!("Travel to '{title}' needs {buffer} minutes of buffer{source}"),
                    &recommendation,
                ));
            } else if buffer > self.thresholds.warning_buffer_minutes {
                alerts.push(alert(
                    AlertTier::Warning,
                    format!("Travel to '{title}' needs {buffer} minutes of buffer{source}"),
                    "Monitor traffic and weather conditions",
                ));
            }

            if estimate.confidence < self.thresholds.min_confidence {
                alerts.push(alert(
                    AlertTier::Warning,
                    format!(
                        "Low confidence ({}%) in the travel estimate for '{title}'{source}",
                        estimate.confidence
                    ),
                    "Add extra margin and re-check closer to the event",
                ));
            }
        }

        alerts
    }
}

impl Default for AlertGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to generate alerts with default thresholds
pub fn generate_alerts(events: &[ScheduleEvent], estimates: &[GapEstimate]) -> Vec<Alert> {
    AlertGenerator::new().generate(events, estimates)
}
