use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;

use crate::domain::errors::ConfigError;
use crate::domain::models::config::Config;
use crate::infrastructure::logging::logger::parse_log_level;

/// Deployment variables read without the `KEEPDB_` prefix, and the config key
/// each one sets.
const DEPLOYMENT_VARS: [(&str, &str); 4] = [
    ("TURSO_DATABASE_URL", "database.remote_url"),
    ("TURSO_AUTH_TOKEN", "database.auth_token"),
    ("DB_WAL_MODE", "database.wal_mode"),
    ("DATA_DIR", "data_dir"),
];

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. keepdb.yaml (project config)
    /// 3. keepdb.local.yaml (local overrides, optional)
    /// 4. Environment variables (KEEPDB_* prefix, `__` separates nested keys)
    /// 5. Deployment variables (TURSO_DATABASE_URL, TURSO_AUTH_TOKEN, DB_WAL_MODE, DATA_DIR)
    pub fn load() -> Result<Config, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file("keepdb.yaml"))
            .merge(Yaml::file("keepdb.local.yaml"));

        Self::finish(figment)
    }

    /// Load configuration from a specific file, still honoring environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()));

        Self::finish(figment)
    }

    fn finish(figment: Figment) -> Result<Config, ConfigError> {
        let mut config: Config = figment
            .merge(Env::prefixed("KEEPDB_").split("__"))
            .merge(deployment_env())
            .extract()
            .map_err(Box::new)?;

        Self::place_in_data_dir(&mut config);
        Self::validate(&config)?;
        Ok(config)
    }

    /// A relative database path lives under the data directory when one is set.
    fn place_in_data_dir(config: &mut Config) {
        if let Some(data_dir) = &config.data_dir {
            if config.database.path.is_relative() {
                config.database.path = data_dir.join(&config.database.path);
            }
        }
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        parse_log_level(&config.logging.level)?;
        Ok(())
    }
}

fn deployment_env() -> Env {
    let names: Vec<&str> = DEPLOYMENT_VARS.iter().map(|(var, _)| *var).collect();
    Env::raw().only(&names).map(|key| {
        DEPLOYMENT_VARS
            .iter()
            .find(|(var, _)| key.as_str().eq_ignore_ascii_case(var))
            .map_or_else(|| key.as_str().into(), |(_, path)| (*path).into())
    })
}
