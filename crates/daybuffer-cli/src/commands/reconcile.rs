//! Reconcile a timeline file against the configured traffic and weather services.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use serde::Serialize;

use daybuffer_core::session::resolve_locations;
use daybuffer_core::{
    plan_session, Alert, AlertGenerator, EngineConfig, HttpTrafficGateway, HttpWeatherGateway,
    LocationDirectory, Reconciler, Reconciliation, TimelineStore,
};

use crate::files::{JsonLocationFile, JsonTimelineFile, ReportSink};

#[derive(Args)]
pub struct ReconcileArgs {
    /// Timeline JSON file (array of events)
    #[arg(long)]
    pub timeline: PathBuf,
    /// Locations JSON file (object keyed by location ref)
    #[arg(long)]
    pub locations: PathBuf,
    /// Write the adjusted timeline back to the timeline file
    #[arg(long)]
    pub write: bool,
    /// Include alerts in the output
    #[arg(long)]
    pub alerts: bool,
    /// Location ref to use for events whose location is not in the file
    #[arg(long)]
    pub default_location: Option<String>,
}

#[derive(Serialize)]
struct ReconcileOutput {
    reconciliation: Reconciliation,
    #[serde(skip_serializing_if = "Option::is_none")]
    alerts: Option<Vec<Alert>>,
}

pub fn run(args: ReconcileArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load_or_default();
    let runtime = tokio::runtime::Runtime::new()?;
    let output = runtime.block_on(execute(&args, &config))?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn execute(
    args: &ReconcileArgs,
    config: &EngineConfig,
) -> Result<ReconcileOutput, Box<dyn std::error::Error>> {
    let store = JsonTimelineFile::new(&args.timeline);
    let directory = JsonLocationFile::load(&args.locations)?;

    let mut reconciler = Reconciler::from_config(
        config,
        Arc::new(HttpTrafficGateway::new(&config.traffic)),
        Arc::new(HttpWeatherGateway::new(&config.weather)),
    );
    if let Some(location_ref) = &args.default_location {
        reconciler = reconciler.with_default_location(directory.resolve(location_ref)?);
    }
    let generator = AlertGenerator::with_thresholds((&config.alerts).into());

    if args.write {
        let outcome =
            plan_session(&store, &directory, &ReportSink, &reconciler, &generator, "cli").await?;
        tracing::info!(path = %args.timeline.display(), "adjusted timeline written");
        return Ok(ReconcileOutput {
            reconciliation: outcome.reconciliation,
            alerts: args.alerts.then_some(outcome.alerts),
        });
    }

    let events = store.load_timeline("cli")?;
    let locations = resolve_locations(&directory, &events);
    let reconciliation = reconciler.reconcile(&events, &locations).await?;
    let alerts = args
        .alerts
        .then(|| generator.generate(&reconciliation.events, &reconciliation.estimates));

    Ok(ReconcileOutput {
        reconciliation,
        alerts,
    })
}
