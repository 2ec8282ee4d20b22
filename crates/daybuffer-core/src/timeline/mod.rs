//! Timeline data model.
//!
//! This module provides:
//! - Schedule events and their validation
//! - Location descriptors supplied by the location directory
//! - Travel gap detection between consecutive events

mod event;
mod gap;
mod location;

pub use event::{validate_timeline, EventKind, Priority, Provenance, ScheduleEvent};
pub use gap::{detect_travel_gaps, needs_travel, TravelGap};
pub use location::{GeoPoint, LocationCategory, LocationDescriptor};
