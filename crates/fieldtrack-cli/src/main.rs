use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fieldtrack_infrastructure::ConfigService;

mod commands;

#[derive(Parser)]
#[command(name = "fieldtrack")]
#[command(about = "Fieldtrack CLI - foreground location tracking for field operations", long_about = None)]
struct Cli {
    /// Config file path (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a tracking session until the stop signal
    Run {
        /// Replay fixture driving the satellite provider
        #[arg(long)]
        fixture: Option<PathBuf>,
        /// Replay cadence in milliseconds
        #[arg(long, default_value_t = 1000)]
        cadence_ms: u64,
        /// Send the stop signal after this many updates
        #[arg(long)]
        max_updates: Option<u64>,
    },
    /// Inspect or seed the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Create the config file with defaults
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config_service = match cli.config {
        Some(path) => ConfigService::new(path),
        None => ConfigService::default_location()?,
    };

    match cli.command {
        Commands::Run {
            fixture,
            cadence_ms,
            max_updates,
        } => commands::run::execute(config_service, fixture, cadence_ms, max_updates).await,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config_service),
            ConfigAction::Init => commands::config::init(&config_service),
        },
    }
}
