//! Timeline reconciliation.
//!
//! Walks an ordered event sequence, estimates travel for every
//! location-changing gap and cascades shifts forward when a buffer does not
//! fit the scheduled gap.

mod cascade;
mod reconciler;
mod report;

pub use cascade::{apply_shifts, CascadeOutcome, FALLBACK_NOTE};
pub use reconciler::Reconciler;
pub use report::{FallbackRecord, GapEstimate, Reconciliation};
