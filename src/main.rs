mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use availability_core::AvailabilityConfig;
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "availability")]
#[command(about = "Load chalet booking calendars and show which properties are occupied")]
struct Cli {
    /// Config file (defaults to <config dir>/availability/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log more (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every property's calendar (or the snapshot) and list bookings
    Sync {
        /// Only show this property (by slug)
        #[arg(short, long)]
        property: Option<String>,

        /// Show which properties are occupied on this date (YYYY-MM-DD)
        #[arg(long)]
        on: Option<NaiveDate>,

        /// Print the booking collection as JSON
        #[arg(long)]
        json: bool,
    },
    /// Parse a single .ics file and list the bookings it yields
    Parse {
        file: PathBuf,

        /// Property the file belongs to (defaults to the file name)
        #[arg(short, long)]
        slug: Option<String>,

        /// Print bookings as JSON
        #[arg(long)]
        json: bool,
    },
    /// List configured properties and their calendar locations
    Properties,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AvailabilityConfig::load(cli.config.as_deref())?;
    tracing::debug!(
        properties = config.properties.len(),
        ics_base = %config.ics_base,
        use_ics = config.use_ics,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Sync { property, on, json } => {
            commands::sync::run(&config, property.as_deref(), on, json).await
        }
        Commands::Parse { file, slug, json } => {
            commands::parse::run(&config, &file, slug.as_deref(), json).await
        }
        Commands::Properties => commands::properties::run(&config),
    }
}

/// Logs go to stderr so rendered output on stdout stays clean.
/// `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
