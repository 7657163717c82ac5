use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::infrastructure::logging::LogConfig;

/// Main configuration structure for keepdb
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Data directory; a relative database path is placed inside it
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LogConfig,
}

/// Database settings snapshot handed to the backend resolver.
///
/// A non-blank `remote_url` selects the remote backend; otherwise `path` is
/// opened as a local file.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseSettings {
    /// Remote libSQL server URL (e.g. `libsql://db.example.turso.io`)
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Auth token for the remote server
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Path to the local `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// Enable write-ahead logging for local files
    #[serde(default)]
    pub wal_mode: bool,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("db.db")
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            remote_url: None,
            auth_token: None,
            path: default_database_path(),
            wal_mode: false,
        }
    }
}

impl DatabaseSettings {
    /// Settings for a local database file.
    pub fn local(path: impl Into<PathBuf>, wal_mode: bool) -> Self {
        Self {
            path: path.into(),
            wal_mode,
            ..Default::default()
        }
    }

    /// Settings for a remote database.
    pub fn remote(url: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            remote_url: Some(url.into()),
            auth_token,
            ..Default::default()
        }
    }

    /// Durability mode requested by the `wal_mode` flag.
    pub const fn durability(&self) -> DurabilityMode {
        DurabilityMode::from_wal_flag(self.wal_mode)
    }
}

impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("remote_url", &self.remote_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("path", &self.path)
            .field("wal_mode", &self.wal_mode)
            .finish()
    }
}

/// Trade-off between write throughput and crash recovery for local files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurabilityMode {
    /// WAL journal with `synchronous = NORMAL`
    WriteAheadLog,
    /// Rollback journal (`journal_mode = DELETE`)
    RollbackJournal,
}

impl DurabilityMode {
    pub const fn from_wal_flag(wal_mode: bool) -> Self {
        if wal_mode {
            Self::WriteAheadLog
        } else {
            Self::RollbackJournal
        }
    }
}

impl std::fmt::Display for DurabilityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WriteAheadLog => write!(f, "write-ahead log"),
            Self::RollbackJournal => write!(f, "rollback journal"),
        }
    }
}
