//! JSON-file collaborators for the CLI host.
//!
//! The timeline file holds an array of events; the locations file holds an
//! object mapping location refs to descriptors. Alerts are printed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use daybuffer_core::error::Result;
use daybuffer_core::{
    Alert, CoreError, LocationDescriptor, LocationDirectory, NotificationSink, ScheduleEvent,
    TimelineStore,
};

/// Timeline store over a single JSON file; the session id is ignored.
pub struct JsonTimelineFile {
    path: PathBuf,
}

impl JsonTimelineFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TimelineStore for JsonTimelineFile {
    fn load_timeline(&self, _session_id: &str) -> Result<Vec<ScheduleEvent>> {
        read_json(&self.path)
    }

    fn save_timeline(&self, _session_id: &str, events: &[ScheduleEvent]) -> Result<()> {
        let content = serde_json::to_string_pretty(events)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Location directory loaded from a JSON object.
pub struct JsonLocationFile {
    locations: HashMap<String, LocationDescriptor>,
}

impl JsonLocationFile {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            locations: read_json(path)?,
        })
    }
}

impl LocationDirectory for JsonLocationFile {
    fn resolve(&self, location_ref: &str) -> Result<LocationDescriptor> {
        self.locations
            .get(location_ref)
            .cloned()
            .ok_or_else(|| CoreError::Custom(format!("unknown location: {location_ref}")))
    }
}

/// Sink that keeps nothing; alerts are printed with the report instead.
pub struct ReportSink;

impl NotificationSink for ReportSink {
    fn deliver(&self, alerts: &[Alert]) -> Result<()> {
        for alert in alerts {
            tracing::info!(
                event = %alert.event_id,
                tier = ?alert.tier,
                fallback = alert.fallback,
                "{}",
                alert.message
            );
        }
        Ok(())
    }
}

pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CoreError::Custom(format!("cannot read {}: {e}", path.display()))
    })?;
    Ok(serde_json::from_str(&content)?)
}
