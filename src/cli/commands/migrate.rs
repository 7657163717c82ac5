//! Implementation of the `keepdb migrate` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::adapters::libsql::{MigrationSet, Migrator};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::database;

#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Read migrations from this directory instead of the built-in history
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct MigrateOutput {
    pub success: bool,
    pub target: String,
    pub applied: usize,
    pub version: u32,
}

impl CommandOutput for MigrateOutput {
    fn to_human(&self) -> String {
        if self.applied == 0 {
            format!("{} is up to date (version {})", self.target, self.version)
        } else {
            format!(
                "Applied {} migration(s) to {}; now at version {}",
                self.applied, self.target, self.version
            )
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: MigrateArgs, config: &Config, json_mode: bool) -> Result<()> {
    let migrations = match args.dir {
        Some(ref dir) => MigrationSet::from_dir(dir)
            .with_context(|| format!("Failed to load migrations from {}", dir.display()))?,
        None => MigrationSet::embedded(),
    };

    let db = database::initialize(&config.database)
        .await
        .context("Failed to initialize database")?;

    let migrator = Migrator::new(db);
    let applied = migrator.run(&migrations).await.context("Migration failed")?;
    let version = migrator.current_version().await?;

    output(
        &MigrateOutput {
            success: true,
            target: db.target().to_string(),
            applied,
            version,
        },
        json_mode,
    );
    Ok(())
}
