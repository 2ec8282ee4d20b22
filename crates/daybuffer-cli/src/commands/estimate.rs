//! One-off travel estimate from snapshot files.

use std::path::PathBuf;

use clap::Args;
use daybuffer_core::{estimate_travel, EventKind, TrafficSnapshot, WeatherSnapshot};

use crate::files::read_json;

#[derive(Args)]
pub struct EstimateArgs {
    /// Traffic snapshot JSON file
    #[arg(long)]
    pub traffic: PathBuf,
    /// Weather snapshot JSON file
    #[arg(long)]
    pub weather: PathBuf,
    /// Kind of the destination event (ceremony, reception, photo_session, ...)
    #[arg(long, default_value = "travel")]
    pub kind: String,
}

pub fn run(args: EstimateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let kind = parse_kind(&args.kind).ok_or_else(|| format!("unknown event kind: {}", args.kind))?;
    let traffic: TrafficSnapshot = read_json(&args.traffic)?;
    let weather: WeatherSnapshot = read_json(&args.weather)?;

    let estimate = estimate_travel(&traffic, &weather, kind);
    println!("{}", serde_json::to_string_pretty(&estimate)?);
    Ok(())
}

fn parse_kind(kind: &str) -> Option<EventKind> {
    match kind.to_lowercase().replace('-', "_").as_str() {
        "preparation" | "prep" => Some(EventKind::Preparation),
        "ceremony" => Some(EventKind::Ceremony),
        "reception" => Some(EventKind::Reception),
        "photo_session" | "photo" => Some(EventKind::PhotoSession),
        "travel" => Some(EventKind::Travel),
        "buffer" => Some(EventKind::Buffer),
        _ => None,
    }
}
