//! libSQL adapter: the database client capability behind every connection
//! target (remote server, local file, in-memory).

pub mod connection;
pub mod error;
pub mod migrations;
pub mod rows;
pub mod transaction;

pub use connection::Database;
pub use error::result_code_name;
pub use libsql::Value;
pub use migrations::{AppliedMigration, Migration, MigrationSet, Migrator};
pub use rows::{FromColumn, Row, Rows};
pub use transaction::Transaction;
