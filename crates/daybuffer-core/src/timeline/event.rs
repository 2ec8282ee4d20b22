//! Schedule events on the day-of timeline.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Kind of activity an event represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Preparation,
    Ceremony,
    Reception,
    PhotoSession,
    Travel,
    Buffer,
}

impl EventKind {
    /// Weight applied to the weather delay when travelling to this kind.
    ///
    /// Time-critical kinds are upweighted, flexible ones discounted.
    pub fn weather_multiplier(&self) -> f64 {
        match self {
            EventKind::Ceremony => 1.5,
            EventKind::PhotoSession => 1.2,
            EventKind::Preparation | EventKind::Reception | EventKind::Travel => 1.0,
            EventKind::Buffer => 0.8,
        }
    }

    /// Minimum buffer in minutes reserved before an event of this kind.
    pub fn minimum_buffer_minutes(&self) -> u32 {
        match self {
            EventKind::Ceremony => 30,
            EventKind::Reception => 20,
            EventKind::PhotoSession => 15,
            EventKind::Preparation => 15,
            EventKind::Travel => 10,
            EventKind::Buffer => 5,
        }
    }
}

/// Importance of an event for the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    Important,
    Optional,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Important
    }
}

/// Who last set an event's times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Manual,
    AutoAdjusted,
}

impl Default for Provenance {
    fn default() -> Self {
        Self::Manual
    }
}

/// A unit of activity on the day's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEvent {
    pub id: String,
    pub title: String,
    pub kind: EventKind,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Key into the location map handed to the reconciler.
    pub location_ref: String,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub equipment: Option<Vec<String>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub weather_sensitive: bool,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub provenance: Provenance,
}

impl ScheduleEvent {
    /// Create a manual event with empty optional fields.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        kind: EventKind,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        location_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            start_time,
            end_time,
            location_ref: location_ref.into(),
            participants: Vec::new(),
            equipment: None,
            priority: Priority::default(),
            weather_sensitive: false,
            notes: String::new(),
            provenance: Provenance::Manual,
        }
    }

    /// Length of the activity itself.
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Move the event later by `delay`, keeping its duration.
    pub(crate) fn translate(&mut self, delay: Duration) {
        self.start_time += delay;
        self.end_time += delay;
        self.provenance = Provenance::AutoAdjusted;
    }

    /// Append a bracketed marker to the notes unless it is already present.
    pub(crate) fn append_note(&mut self, note: &str) {
        if self.notes.contains(note) {
            return;
        }
        if !self.notes.is_empty() {
            self.notes.push(' ');
        }
        self.notes.push_str(note);
    }
}

/// Check that a timeline is non-empty, each event has `start < end`, and
/// events are in non-decreasing start order.
pub fn validate_timeline(events: &[ScheduleEvent]) -> Result<(), ValidationError> {
    if events.is_empty() {
        return Err(ValidationError::EmptyCollection("timeline has no events".into()));
    }

    for event in events {
        if event.start_time >= event.end_time {
            return Err(ValidationError::InvalidTimeRange {
                event_id: event.id.clone(),
                start: event.start_time,
                end: event.end_time,
            });
        }
    }

    for (index, pair) in events.windows(2).enumerate() {
        if pair[1].start_time < pair[0].start_time {
            return Err(ValidationError::Unordered {
                index: index + 1,
                previous: pair[0].start_time,
                current: pair[1].start_time,
            });
        }
    }

    Ok(())
}
