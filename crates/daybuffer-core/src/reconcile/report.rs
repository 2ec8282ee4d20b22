use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timeline::ScheduleEvent;
use crate::travel::{AlternateRoute, TravelEstimate};

/// The estimate computed for one travel gap and what it did to the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapEstimate {
    /// Index of the departing event.
    pub gap_index: usize,
    pub from_event_id: String,
    pub to_event_id: String,
    pub estimate: TravelEstimate,
    /// Minutes the arriving event was pushed back (0 if it already fit).
    pub shift_minutes: i64,
    /// Fastest alternate route the traffic provider offered, if any.
    #[serde(default)]
    pub alternate_route: Option<AlternateRoute>,
}

/// A gap whose estimate had to fall back to the conservative default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackRecord {
    pub gap_index: usize,
    pub from_event_id: String,
    pub to_event_id: String,
    /// One entry per gateway failure.
    pub reasons: Vec<String>,
}

/// Result of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub run_id: Uuid,
    /// Adjusted timeline, same events in the same order.
    pub events: Vec<ScheduleEvent>,
    pub estimates: Vec<GapEstimate>,
    pub diagnostics: Vec<FallbackRecord>,
    /// Events this run moved, in timeline order.
    pub shifted_event_ids: Vec<String>,
}

impl Reconciliation {
    /// Number of events moved by this run, including co-located followers.
    pub fn shifted_count(&self) -> usize {
        self.shifted_event_ids.len()
    }

    pub fn fallback_count(&self) -> usize {
        self.diagnostics.len()
    }

    /// Whether any gap relied on the fallback estimate.
    pub fn is_degraded(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}
