//! Left-to-right shift application.
//!
//! The adjusted timeline is built by folding over the gaps in order. The
//! previously pushed event is already final when the next gap is evaluated,
//! so every required start is computed from finalized times only.

use std::collections::BTreeMap;

use chrono::Duration;

use crate::timeline::{needs_travel, ScheduleEvent};
use crate::travel::TravelEstimate;

pub const FALLBACK_NOTE: &str = "[FALLBACK ESTIMATE: live traffic/weather unavailable]";

/// Adjusted events plus the delay applied to each of them.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome {
    pub events: Vec<ScheduleEvent>,
    /// `delays[i]` is how far `events[i]` was pushed back.
    pub delays: Vec<Duration>,
}

/// Minutes covered by a positive delay, counting a partial minute as whole.
pub(crate) fn whole_minutes(delay: Duration) -> i64 {
    if delay <= Duration::zero() {
        return 0;
    }
    (delay + Duration::minutes(1) - Duration::nanoseconds(1)).num_minutes()
}

fn travel_note(delay: Duration) -> String {
    format!("[AUTO-ADJUSTED: +{}min for traffic/weather]", whole_minutes(delay))
}

fn cascade_note(delay: Duration) -> String {
    format!("[AUTO-ADJUSTED: +{}min cascaded from earlier shift]", whole_minutes(delay))
}

/// Apply travel buffers to a validated timeline.
///
/// `estimates` maps a gap index (the departing event) to its estimate and
/// must contain every location-changing gap. Co-located neighbours need no
/// buffer, but keep their original spacing (or overlap) when the event in
/// front of them is pushed, so start order survives the shift.
pub fn apply_shifts(
    events: &[ScheduleEvent],
    estimates: &BTreeMap<usize, TravelEstimate>,
) -> CascadeOutcome {
    let mut adjusted: Vec<ScheduleEvent> = Vec::with_capacity(events.len());
    let mut delays = vec![Duration::zero(); events.len()];

    let Some(first) = events.first() else {
        return CascadeOutcome {
            events: adjusted,
            delays,
        };
    };
    adjusted.push(first.clone());

    for (index, pair) in events.windows(2).enumerate() {
        let (original_prev, original_next) = (&pair[0], &pair[1]);
        let prev_end = adjusted[index].end_time;
        let mut next = original_next.clone();

        let travel = needs_travel(original_prev, original_next);
        let estimate = estimates.get(&index).filter(|_| travel);

        let required_start = match estimate {
            Some(estimate) => prev_end + Duration::minutes(estimate.total_buffer_minutes as i64),
            None => {
                let original_gap = original_next.start_time - original_prev.end_time;
                prev_end + original_gap.min(Duration::zero())
            }
        };

        if let Some(estimate) = estimate {
            if estimate.is_fallback() {
                next.append_note(FALLBACK_NOTE);
            }
        }

        if required_start > next.start_time {
            let delay = required_start - next.start_time;
            next.translate(delay);
            let note = if estimate.is_some() {
                travel_note(delay)
            } else {
                cascade_note(delay)
            };
            next.append_note(&note);
            delays[index + 1] = delay;
        }

        adjusted.push(next);
    }

    CascadeOutcome {
        events: adjusted,
        delays,
    }
}
