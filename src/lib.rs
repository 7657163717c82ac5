//! keepdb - database connection bootstrap
//!
//! Decides whether the application talks to a remote libSQL server or a local
//! `SQLite` file, opens the connection, tunes local files with a fixed directive
//! sequence, and publishes the result as a process-wide handle. Test harnesses
//! get isolated in-memory databases, optionally with the migration history
//! replayed into them.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): connection targets, directives, schema descriptor, errors
//! - **Adapters** (`adapters`): the libSQL client, migrations and transactions
//! - **Infrastructure Layer** (`infrastructure`): bootstrap, process-wide handle, config, logging
//! - **CLI Layer** (`cli`): `keepdb migrate` / `keepdb status`
//!
//! # Example
//!
//! ```ignore
//! use keepdb::{create_ephemeral, initialize_from_env};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = initialize_from_env().await?;
//!     db.verify().await?;
//!
//!     let scratch = create_ephemeral(true).await?;
//!     scratch.execute("DELETE FROM bookmarks", ()).await?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use adapters::libsql::{
    AppliedMigration, Database, FromColumn, Migration, MigrationSet, Migrator, Row, Rows,
    Transaction, Value,
};
pub use domain::models::{
    Config, ConnectionTarget, DatabaseSettings, Directive, DurabilityMode, Schema, SCHEMA,
};
pub use domain::{ConfigError, DatabaseError, DatabaseResult, MigrationError, SqliteError};
pub use infrastructure::config::ConfigLoader;
pub use infrastructure::database::{
    create_ephemeral, create_ephemeral_with, database, initialize, initialize_from_env, is_ready,
    BootstrapState, Bootstrapper,
};
