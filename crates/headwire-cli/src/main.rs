use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use headwire_core::{storage::Database, AppConfig};

mod commands;

#[derive(Parser)]
#[command(name = "headwire")]
#[command(author, version, about = "Political headline tracker fed by RSS")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one ingestion cycle now
    Fetch {
        /// Fetch and filter without writing to the database
        #[arg(long)]
        dry_run: bool,
        /// Poll only the priority feeds with a single attempt each
        #[arg(long)]
        tight: bool,
    },
    /// Delete headlines past the retention window
    Cleanup {
        /// Delete every stored headline instead
        #[arg(long)]
        all: bool,
    },
    /// Show the most recent headlines
    List {
        /// Maximum number of headlines
        #[arg(short = 'l', long)]
        limit: Option<u32>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show the configured feeds
    Feeds,
    /// Background daemon for scheduled ingestion and retention
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
}

#[derive(Subcommand)]
enum DaemonAction {
    /// Start the background daemon
    Start,
    /// Stop the background daemon
    Stop,
    /// Check daemon status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = Arc::new(config);

    match cli.command {
        Commands::Fetch { dry_run, tight } => {
            commands::fetch::run(config, dry_run, tight).await
        }
        Commands::Cleanup { all } => commands::cleanup::run(&config, all).await,
        Commands::List { limit, json } => {
            commands::list::run(&config, limit, json).await
        }
        Commands::Feeds => commands::feeds::run(&config),
        Commands::Daemon { action } => match action {
            DaemonAction::Start => {
                let db = Database::new(&config)?;
                commands::daemon::start(db, config).await
            }
            DaemonAction::Stop => commands::daemon::stop().await,
            DaemonAction::Status => commands::daemon::status(&config).await,
        },
    }
}
