//! CLI command implementations.

pub mod migrate;
pub mod status;

use anyhow::{Context, Result};
use std::path::Path;

use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

/// Load configuration from `path`, or from the default locations.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => ConfigLoader::load().context("Failed to load configuration"),
    }
}
