//! Domain errors for the keepdb bootstrap layer.
//!
//! None of these types name the database client library. Client failures are
//! converted into [`SqliteError`] at the adapter boundary, which keeps the
//! client's result code and message but gives them a stable shape.

use std::path::PathBuf;

use thiserror::Error;

use super::models::Directive;

/// Failure reported by the database engine.
///
/// `code` is the symbolic result code (e.g. `SQLITE_CONSTRAINT`) and `message`
/// is the engine's text, both passed through unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message} ({code})")]
pub struct SqliteError {
    pub code: String,
    pub message: String,
}

impl SqliteError {
    /// Create an error from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid remote database URL: {0:?}. Expected a URL with a scheme such as libsql:, https: or file:")]
    InvalidRemoteUrl(String),

    #[error("Database path {} is not usable: {source}", .path.display())]
    UnusableDatabasePath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

/// Errors raised while loading or replaying the migration history.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Failed to execute migration {version} ({name}): {source}")]
    Execution {
        version: u32,
        name: String,
        #[source]
        source: SqliteError,
    },

    #[error("Failed to read schema version: {0}")]
    VersionCheck(#[source] SqliteError),

    #[error("Failed to read migration directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid migration file name: {0}. Expected NNNN_name.sql")]
    InvalidFileName(String),

    #[error("Duplicate migration version: {0}")]
    DuplicateVersion(u32),
}

/// Errors surfaced by connection bootstrap and the connection handle.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to connect to {target}: {source}")]
    Connection {
        target: String,
        #[source]
        source: SqliteError,
    },

    #[error("Failed to apply directive `{directive}`: {source}")]
    Directive {
        directive: Directive,
        #[source]
        source: SqliteError,
    },

    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    #[error("Query failed: {0}")]
    Query(#[from] SqliteError),

    #[error("Process-wide database has not been initialized")]
    NotInitialized,
}

/// Result alias for bootstrap operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Directive, CACHE_SIZE_KIB};

    #[test]
    fn test_sqlite_error_display_keeps_code_and_message() {
        let err = SqliteError::new("SQLITE_BUSY", "database is locked");
        assert_eq!(err.to_string(), "database is locked (SQLITE_BUSY)");
        assert_eq!(err.code, "SQLITE_BUSY");
        assert_eq!(err.message, "database is locked");
    }

    #[test]
    fn test_directive_error_names_statement() {
        let err = DatabaseError::Directive {
            directive: Directive::CacheSize {
                kibibytes: CACHE_SIZE_KIB,
            },
            source: SqliteError::new("SQLITE_ERROR", "rejected"),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("PRAGMA cache_size = -65536"), "{rendered}");
        assert!(rendered.contains("SQLITE_ERROR"), "{rendered}");
    }
}
