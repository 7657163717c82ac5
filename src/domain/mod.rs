//! Domain layer for the keepdb bootstrap
//!
//! Backend selection, tuning directives, schema descriptor and error types.
//! Nothing here performs I/O.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{ConfigError, DatabaseError, DatabaseResult, MigrationError, SqliteError};
pub use ports::DirectiveExecutor;
