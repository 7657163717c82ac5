//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::migrate::MigrateArgs;
use super::commands::status::StatusArgs;

#[derive(Parser)]
#[command(name = "keepdb")]
#[command(about = "keepdb - database bootstrap and migration tool", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to keepdb.yaml + keepdb.local.yaml)
    #[arg(short, long, global = true, env = "KEEPDB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply pending schema migrations to the configured database
    Migrate(MigrateArgs),

    /// Show the resolved backend and applied migrations
    Status(StatusArgs),
}
