//! Planning-session orchestration over the external collaborators.
//!
//! The engine does not own persistence, geocoding or delivery. A host plugs
//! in a [`TimelineStore`], a [`LocationDirectory`] and a
//! [`NotificationSink`]; [`plan_session`] wires them around one
//! reconciliation run.

use std::collections::{BTreeSet, HashMap};

use crate::alerts::{Alert, AlertGenerator};
use crate::error::Result;
use crate::reconcile::{Reconciler, Reconciliation};
use crate::timeline::{LocationDescriptor, ScheduleEvent};

/// Supplies and persists the ordered event sequence of a session.
pub trait TimelineStore: Send + Sync {
    fn load_timeline(&self, session_id: &str) -> Result<Vec<ScheduleEvent>>;

    fn save_timeline(&self, session_id: &str, events: &[ScheduleEvent]) -> Result<()>;
}

/// Resolves location references to descriptors.
pub trait LocationDirectory: Send + Sync {
    fn resolve(&self, location_ref: &str) -> Result<LocationDescriptor>;
}

/// Consumes alerts for display or delivery.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, alerts: &[Alert]) -> Result<()>;
}

/// What a planning pass produced.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub reconciliation: Reconciliation,
    pub alerts: Vec<Alert>,
}

/// Resolve every distinct location reference of a timeline.
///
/// References the directory cannot resolve are left out; the reconciler
/// reports them unless it has a default location.
pub fn resolve_locations(
    directory: &dyn LocationDirectory,
    events: &[ScheduleEvent],
) -> HashMap<String, LocationDescriptor> {
    let refs: BTreeSet<&str> = events.iter().map(|e| e.location_ref.as_str()).collect();

    refs.into_iter()
        .filter_map(|location_ref| match directory.resolve(location_ref) {
            Ok(descriptor) => Some((location_ref.to_string(), descriptor)),
            Err(e) => {
                tracing::warn!(location_ref, error = %e, "location could not be resolved");
                None
            }
        })
        .collect()
}

/// Load, reconcile, save and alert for one session.
///
/// The adjusted timeline is saved only after reconciliation finished, and
/// alerts are delivered after the save.
///
/// # Errors
///
/// Propagates store and sink failures and reconciliation validation errors.
/// Gateway failures do not surface here.
pub async fn plan_session(
    store: &dyn TimelineStore,
    directory: &dyn LocationDirectory,
    sink: &dyn NotificationSink,
    reconciler: &Reconciler,
    alert_generator: &AlertGenerator,
    session_id: &str,
) -> Result<SessionOutcome> {
    let events = store.load_timeline(session_id)?;
    let locations = resolve_locations(directory, &events);

    let reconciliation = reconciler.reconcile(&events, &locations).await?;
    store.save_timeline(session_id, &reconciliation.events)?;

    let alerts = alert_generator.generate(&reconciliation.events, &reconciliation.estimates);
    sink.deliver(&alerts)?;

    tracing::info!(
        session_id,
        alerts = alerts.len(),
        degraded = reconciliation.is_degraded(),
        "planning session complete"
    );

    Ok(SessionOutcome {
        reconciliation,
        alerts,
    })
}
