use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod files;

#[derive(Parser)]
#[command(name = "daybuffer-cli", version, about = "Travel buffers and timeline reconciliation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a timeline against live traffic and weather
    Reconcile(commands::reconcile::ReconcileArgs),
    /// Compute a travel estimate from snapshot files
    Estimate(commands::estimate::EstimateArgs),
    /// Regenerate alerts from a saved reconciliation report
    Alerts(commands::alerts::AlertsArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    // Logs go to stderr so stdout stays machine-readable JSON.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daybuffer_core=info,daybuffer_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Reconcile(args) => commands::reconcile::run(args),
        Commands::Estimate(args) => commands::estimate::run(args),
        Commands::Alerts(args) => commands::alerts::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
