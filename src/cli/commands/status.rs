//! Implementation of the `keepdb status` command.

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::Cell;
use serde::Serialize;

use crate::adapters::libsql::{AppliedMigration, Migrator};
use crate::cli::output::{output, table_with_header, CommandOutput};
use crate::domain::models::{Config, SCHEMA};
use crate::infrastructure::database;

#[derive(Args, Debug)]
pub struct StatusArgs {}

#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub target: String,
    pub backend: &'static str,
    /// Only meaningful for local files
    pub durability: Option<String>,
    pub schema_version: u32,
    pub latest_version: u32,
    pub migrations: Vec<AppliedMigration>,
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("Database: {}", self.target)];
        if let Some(durability) = &self.durability {
            lines.push(format!("Durability: {durability}"));
        }
        lines.push(format!(
            "Schema version: {} (latest {})",
            self.schema_version, self.latest_version
        ));

        if self.migrations.is_empty() {
            lines.push("No migrations applied".to_string());
        } else {
            let mut table = table_with_header(&["Version", "Name", "Applied at"]);
            for migration in &self.migrations {
                table.add_row(vec![
                    Cell::new(migration.version),
                    Cell::new(&migration.name),
                    Cell::new(&migration.applied_at),
                ]);
            }
            lines.push(table.to_string());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(_args: StatusArgs, config: &Config, json_mode: bool) -> Result<()> {
    let db = database::initialize(&config.database)
        .await
        .context("Failed to initialize database")?;

    let migrator = Migrator::new(db);
    let status = StatusOutput {
        target: db.target().to_string(),
        backend: db.target().kind(),
        durability: (!db.target().is_remote())
            .then(|| config.database.durability().to_string()),
        schema_version: migrator.current_version().await?,
        latest_version: SCHEMA.version,
        migrations: migrator.applied().await?,
    };

    output(&status, json_mode);
    Ok(())
}
