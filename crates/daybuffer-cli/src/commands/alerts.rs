use std::path::PathBuf;

use clap::Args;
use daybuffer_core::{AlertGenerator, EngineConfig, Reconciliation};

use crate::files::read_json;

#[derive(Args)]
pub struct AlertsArgs {
    /// Reconciliation report JSON, as printed by `reconcile`
    #[arg(long)]
    pub report: PathBuf,
}

pub fn run(args: AlertsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let report: Reconciliation = read_json(&args.report)?;
    let config = EngineConfig::load_or_default();
    let generator = AlertGenerator::with_thresholds((&config.alerts).into());

    let alerts = generator.generate(&report.events, &report.estimates);
    println!("{}", serde_json::to_string_pretty(&alerts)?);
    Ok(())
}
