//! Hotel Predictive Maintenance CLI
//!
//! A command-line tool for training the maintenance model, selecting
//! datasets, and querying per-room predictions and fleet insights.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use maintenance_engine::{EngineConfig, MaintenanceEngine};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Hotel Predictive Maintenance CLI
#[derive(Parser)]
#[command(name = "hmp")]
#[command(author, version, about = "CLI for the hotel predictive-maintenance engine", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the model on an uploaded CSV file
    Train {
        /// Path to a training CSV with the full dataset schema
        file: PathBuf,
    },

    /// Select a registered dataset without retraining
    Select {
        /// Logical dataset name (e.g. fairfield, jwmarriott, westin)
        name: String,
    },

    /// Predict maintenance for every device in a room
    Predict {
        /// Room number
        room: i64,
    },

    /// Show details for one device
    Device {
        /// Room number
        room: i64,

        /// Appliance type (exact match)
        appliance: String,
    },

    /// Show fleet-wide dashboard statistics
    Dashboard,

    /// List devices due within the next six months
    Upcoming,

    /// List devices due in the current week
    Weekly,

    /// List non-room assets
    Assets,

    /// Show engine status and last training metrics
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let config = EngineConfig::load()?;
    let engine = MaintenanceEngine::open(config);

    match cli.command {
        Commands::Train { file } => commands::train::train(&engine, &file, cli.format)?,
        Commands::Select { name } => commands::datasets::select(&engine, &name, cli.format)?,
        Commands::Predict { room } => commands::predict::room(&engine, room, cli.format)?,
        Commands::Device { room, appliance } => {
            commands::predict::device(&engine, room, &appliance, cli.format)?
        }
        Commands::Dashboard => commands::insights::dashboard(&engine, cli.format)?,
        Commands::Upcoming => commands::insights::upcoming(&engine, cli.format)?,
        Commands::Weekly => commands::insights::weekly(&engine, cli.format)?,
        Commands::Assets => commands::datasets::assets(&engine, cli.format)?,
        Commands::Status => commands::datasets::status(&engine, cli.format)?,
    }

    Ok(())
}
