//! libSQL connection handle.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use libsql::params::IntoParams;
use libsql::{Builder, Value};
use tokio::sync::Mutex;
use tracing::debug;

use super::rows::Rows;
use super::transaction::Transaction;
use crate::domain::errors::{ConfigError, DatabaseError, DatabaseResult, SqliteError};
use crate::domain::models::{ConnectionTarget, Directive};
use crate::domain::ports::DirectiveExecutor;

/// Name of the bookkeeping table written by the migrator.
pub(crate) const MIGRATIONS_TABLE: &str = "__migrations";

/// Connection handle bound to exactly one [`ConnectionTarget`].
///
/// Plain statements run on one shared session. Each [`transaction`](Self::transaction)
/// on a file or remote database opens a session of its own, so concurrent
/// callers never share transaction state. An in-memory database exists only
/// inside its first session; its transactions run there one at a time.
pub struct Database {
    db: libsql::Database,
    conn: libsql::Connection,
    target: ConnectionTarget,
    /// Connection-scoped directives, replayed on every new session.
    session_directives: Mutex<Vec<Directive>>,
    serial: Arc<Mutex<()>>,
}

impl Database {
    /// Open a session against `target`.
    ///
    /// For local files the parent directory is created when missing. No retry
    /// is attempted; the first failure is returned.
    pub async fn connect(target: ConnectionTarget) -> DatabaseResult<Self> {
        let connection_error = |source: libsql::Error| DatabaseError::Connection {
            target: target.to_string(),
            source: source.into(),
        };

        let db = match &target {
            ConnectionTarget::Remote { url, auth_token } => {
                Builder::new_remote(url.clone(), auth_token.clone().unwrap_or_default())
                    .build()
                    .await
            }
            ConnectionTarget::LocalFile { path } => {
                ensure_database_directory(path)?;
                Builder::new_local(path).build().await
            }
            ConnectionTarget::Ephemeral => Builder::new_local(":memory:").build().await,
        }
        .map_err(connection_error)?;

        let conn = db.connect().map_err(connection_error)?;
        debug!(target_kind = target.kind(), %target, "database session opened");

        Ok(Self {
            db,
            conn,
            target,
            session_directives: Mutex::new(Vec::new()),
            serial: Arc::new(Mutex::new(())),
        })
    }

    /// Backend this handle is bound to
    pub const fn target(&self) -> &ConnectionTarget {
        &self.target
    }

    /// Execute a statement and return the number of changed rows.
    pub async fn execute(&self, sql: &str, params: impl IntoParams) -> Result<u64, SqliteError> {
        Ok(self.conn.execute(sql, params).await?)
    }

    /// Run a query and return its rows.
    pub async fn query(&self, sql: &str, params: impl IntoParams) -> Result<Rows, SqliteError> {
        Ok(Rows::new(self.conn.query(sql, params).await?))
    }

    /// Begin a transaction isolated from other callers of this handle.
    pub async fn transaction(&self) -> Result<Transaction, SqliteError> {
        if matches!(self.target, ConnectionTarget::Ephemeral) {
            let guard = Arc::clone(&self.serial).lock_owned().await;
            return Ok(Transaction::new(self.conn.transaction().await?, Some(guard)));
        }

        let conn = self.db.connect()?;
        let directives = self.session_directives.lock().await.clone();
        for directive in &directives {
            run_directive(&conn, directive).await?;
        }
        debug!(directives = directives.len(), "transaction session opened");
        Ok(Transaction::new(conn.transaction().await?, None))
    }

    /// Read the current value of a pragma.
    pub async fn pragma(&self, name: &str) -> Result<Option<Value>, SqliteError> {
        let mut rows = self.query(&format!("PRAGMA {name}"), ()).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get_value(0)?)),
            None => Ok(None),
        }
    }

    /// Names of user tables, excluding engine and migrator bookkeeping.
    pub async fn table_names(&self) -> Result<Vec<String>, SqliteError> {
        let sql = format!(
            "SELECT name FROM sqlite_master WHERE type = 'table' \
             AND name NOT LIKE 'sqlite_%' AND name != '{MIGRATIONS_TABLE}' ORDER BY name"
        );
        let mut rows = self.query(&sql, ()).await?;

        let mut names = Vec::new();
        while let Some(row) = rows.next().await? {
            names.push(row.get::<String>(0)?);
        }
        Ok(names)
    }

    /// Round-trip a trivial query to check the session is usable.
    pub async fn verify(&self) -> Result<(), SqliteError> {
        let mut rows = self.query("SELECT 1", ()).await?;
        rows.next().await?;
        Ok(())
    }
}

#[async_trait]
impl DirectiveExecutor for Database {
    async fn apply(&self, directive: &Directive) -> Result<(), SqliteError> {
        run_directive(&self.conn, directive).await?;
        if directive.is_connection_scoped() {
            self.session_directives.lock().await.push(*directive);
        }
        Ok(())
    }
}

async fn run_directive(conn: &libsql::Connection, directive: &Directive) -> Result<(), SqliteError> {
    // Pragmas only take effect once stepped, so drain whatever they return.
    let mut rows = conn.query(&directive.to_sql(), ()).await?;
    while rows.next().await?.is_some() {}
    Ok(())
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database").field("target", &self.target).finish_non_exhaustive()
    }
}

fn ensure_database_directory(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::UnusableDatabasePath {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ephemeral_connection() {
        let db = Database::connect(ConnectionTarget::Ephemeral)
            .await
            .expect("failed to open in-memory database");

        db.verify().await.expect("session should be usable");
        assert_eq!(db.target(), &ConnectionTarget::Ephemeral);
        assert!(db.table_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_local_file_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("db.db");

        let db = Database::connect(ConnectionTarget::LocalFile { path: path.clone() })
            .await
            .expect("failed to open local database");
        db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", ())
            .await
            .unwrap();

        assert!(path.parent().unwrap().is_dir());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_unusable_path_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let result = Database::connect(ConnectionTarget::LocalFile {
            path: blocker.join("sub").join("db.db"),
        })
        .await;

        assert!(matches!(
            result,
            Err(DatabaseError::Config(ConfigError::UnusableDatabasePath { .. }))
        ));
    }

    #[tokio::test]
    async fn test_query_error_keeps_engine_message() {
        let db = Database::connect(ConnectionTarget::Ephemeral).await.unwrap();
        let err = db
            .execute("INSERT INTO missing_table VALUES (1)", ())
            .await
            .unwrap_err();
        assert!(err.message.contains("missing_table"), "{err}");
    }

    #[tokio::test]
    async fn test_apply_directive_sets_pragma() {
        let db = Database::connect(ConnectionTarget::Ephemeral).await.unwrap();
        db.apply(&Directive::ForeignKeys(true)).await.unwrap();
        assert!(matches!(
            db.pragma("foreign_keys").await.unwrap(),
            Some(Value::Integer(1))
        ));
    }

    #[tokio::test]
    async fn test_transaction_session_inherits_connection_directives() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::connect(ConnectionTarget::LocalFile {
            path: dir.path().join("tx.db"),
        })
        .await
        .unwrap();
        db.apply(&Directive::ForeignKeys(true)).await.unwrap();
        db.apply(&Directive::BusyTimeout(crate::domain::models::BUSY_TIMEOUT))
            .await
            .unwrap();

        let tx = db.transaction().await.unwrap();
        for (pragma, expected) in [("foreign_keys", 1), ("busy_timeout", 20_000)] {
            let mut rows = tx.query(&format!("PRAGMA {pragma}"), ()).await.unwrap();
            let row = rows.next().await.unwrap().unwrap();
            assert_eq!(row.get::<i64>(0).unwrap(), expected, "{pragma}");
        }
        tx.rollback().await.unwrap();
    }
}
