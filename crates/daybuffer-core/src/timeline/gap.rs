//! Travel gap detection between consecutive events.
//!
//! A gap exists between two adjacent events whose locations differ; only
//! those gaps need a travel estimate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::ScheduleEvent;

/// A location-changing interval between `events[index]` and `events[index + 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelGap {
    /// Index of the departing event.
    pub index: usize,
    pub from_event_id: String,
    pub to_event_id: String,
    pub origin_ref: String,
    pub destination_ref: String,
    /// Planned end of the departing event.
    pub departure: DateTime<Utc>,
    /// Planned start of the arriving event.
    pub arrival: DateTime<Utc>,
}

impl TravelGap {
    /// Scheduled gap length in minutes (negative when events overlap).
    pub fn scheduled_minutes(&self) -> i64 {
        (self.arrival - self.departure).num_minutes()
    }
}

/// Whether moving from `from` to `to` involves travel.
pub fn needs_travel(from: &ScheduleEvent, to: &ScheduleEvent) -> bool {
    from.location_ref != to.location_ref
}

/// Collect every location-changing gap of a timeline, in order.
pub fn detect_travel_gaps(events: &[ScheduleEvent]) -> Vec<TravelGap> {
    events
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| needs_travel(&pair[0], &pair[1]))
        .map(|(index, pair)| TravelGap {
            index,
            from_event_id: pair[0].id.clone(),
            to_event_id: pair[1].id.clone(),
            origin_ref: pair[0].location_ref.clone(),
            destination_ref: pair[1].location_ref.clone(),
            departure: pair[0].end_time,
            arrival: pair[1].start_time,
        })
        .collect()
}
