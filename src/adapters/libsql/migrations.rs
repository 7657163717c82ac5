//! Schema migration history and the runner that replays it.

use std::path::Path;

use libsql::params::Params;
use libsql::Value;
use tracing::{debug, info, warn};

use super::connection::{Database, MIGRATIONS_TABLE};
use super::rows::Row;
use super::transaction::Transaction;
use crate::domain::errors::{MigrationError, SqliteError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub version: u32,
    pub name: String,
    pub sql: String,
}

impl Migration {
    pub fn new(version: u32, name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            version,
            name: name.into(),
            sql: sql.into(),
        }
    }

    /// Parse a `NNNN_name.sql` file name into its version and name.
    pub fn parse_file_name(file_name: &str) -> Result<(u32, String), MigrationError> {
        let invalid = || MigrationError::InvalidFileName(file_name.to_string());

        let stem = file_name.strip_suffix(".sql").ok_or_else(invalid)?;
        let (prefix, name) = stem.split_once('_').ok_or_else(invalid)?;
        if prefix.is_empty() || name.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let version: u32 = prefix.parse().map_err(|_| invalid())?;
        if version == 0 {
            return Err(invalid());
        }
        Ok((version, name.to_string()))
    }
}

/// Ordered migration history with unique versions.
#[derive(Debug, Clone, Default)]
pub struct MigrationSet {
    migrations: Vec<Migration>,
}

impl MigrationSet {
    /// Sort migrations by version, rejecting duplicates.
    pub fn new(mut migrations: Vec<Migration>) -> Result<Self, MigrationError> {
        migrations.sort_by_key(|m| m.version);
        if let Some(pair) = migrations.windows(2).find(|w| w[0].version == w[1].version) {
            return Err(MigrationError::DuplicateVersion(pair[0].version));
        }
        Ok(Self { migrations })
    }

    /// The migration history compiled into the binary from `migrations/`.
    pub fn embedded() -> Self {
        Self {
            migrations: vec![
                Migration::new(
                    1,
                    "initial_schema",
                    include_str!("../../../migrations/0001_initial_schema.sql"),
                ),
                Migration::new(
                    2,
                    "bookmark_lists",
                    include_str!("../../../migrations/0002_bookmark_lists.sql"),
                ),
                Migration::new(3, "assets", include_str!("../../../migrations/0003_assets.sql")),
            ],
        }
    }

    /// Load `NNNN_name.sql` files from a directory. Other files are ignored.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self, MigrationError> {
        let path = path.as_ref();
        let read_error = |source| MigrationError::ReadDir {
            path: path.to_path_buf(),
            source,
        };

        let mut migrations = Vec::new();
        for entry in std::fs::read_dir(path).map_err(read_error)? {
            let entry = entry.map_err(read_error)?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if !file_name.ends_with(".sql") || !entry.path().is_file() {
                continue;
            }

            let (version, name) = Migration::parse_file_name(file_name)?;
            let sql = std::fs::read_to_string(entry.path()).map_err(|source| {
                MigrationError::ReadDir {
                    path: entry.path(),
                    source,
                }
            })?;
            migrations.push(Migration { version, name, sql });
        }

        Self::new(migrations)
    }

    pub fn latest_version(&self) -> u32 {
        self.migrations.last().map_or(0, |m| m.version)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Migration> {
        self.migrations.iter()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

/// A row of the migration bookkeeping table.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AppliedMigration {
    pub version: u32,
    pub name: String,
    pub applied_at: String,
}

/// Replays a [`MigrationSet`] into a database.
pub struct Migrator<'a> {
    db: &'a Database,
}

impl<'a> Migrator<'a> {
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Apply every migration newer than the current version.
    ///
    /// Each migration runs in its own transaction together with its
    /// bookkeeping row. Returns the number of migrations applied.
    pub async fn run(&self, migrations: &MigrationSet) -> Result<usize, MigrationError> {
        self.ensure_migrations_table().await?;
        let current_version = self.current_version().await?;
        let pending: Vec<_> = migrations
            .iter()
            .filter(|m| m.version > current_version)
            .collect();

        if pending.is_empty() {
            debug!(current_version, "schema is up to date");
            return Ok(0);
        }

        for migration in &pending {
            self.apply_migration(migration).await?;
        }

        info!(
            applied = pending.len(),
            version = migrations.latest_version(),
            "migrations applied"
        );
        Ok(pending.len())
    }

    /// Highest applied version, or 0 for an empty database.
    ///
    /// Read-only: a database that was never migrated is left untouched.
    pub async fn current_version(&self) -> Result<u32, MigrationError> {
        if !self.migrations_table_exists().await? {
            return Ok(0);
        }
        let mut rows = self
            .db
            .query(
                &format!("SELECT COALESCE(MAX(version), 0) FROM {MIGRATIONS_TABLE}"),
                (),
            )
            .await
            .map_err(MigrationError::VersionCheck)?;

        match rows.next().await.map_err(MigrationError::VersionCheck)? {
            Some(row) => row.get::<u32>(0).map_err(MigrationError::VersionCheck),
            None => Ok(0),
        }
    }

    /// Migrations recorded as applied, oldest first.
    pub async fn applied(&self) -> Result<Vec<AppliedMigration>, MigrationError> {
        if !self.migrations_table_exists().await? {
            return Ok(Vec::new());
        }
        let mut rows = self
            .db
            .query(
                &format!("SELECT version, name, applied_at FROM {MIGRATIONS_TABLE} ORDER BY version"),
                (),
            )
            .await
            .map_err(MigrationError::VersionCheck)?;

        let mut applied = Vec::new();
        while let Some(row) = rows.next().await.map_err(MigrationError::VersionCheck)? {
            applied.push(Self::applied_from_row(&row).map_err(MigrationError::VersionCheck)?);
        }
        Ok(applied)
    }

    fn applied_from_row(row: &Row) -> Result<AppliedMigration, SqliteError> {
        Ok(AppliedMigration {
            version: row.get::<u32>(0)?,
            name: row.get::<String>(1)?,
            applied_at: row.get::<String>(2)?,
        })
    }

    async fn migrations_table_exists(&self) -> Result<bool, MigrationError> {
        let mut rows = self
            .db
            .query(
                &format!(
                    "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = '{MIGRATIONS_TABLE}'"
                ),
                (),
            )
            .await
            .map_err(MigrationError::VersionCheck)?;
        Ok(rows
            .next()
            .await
            .map_err(MigrationError::VersionCheck)?
            .is_some())
    }

    async fn ensure_migrations_table(&self) -> Result<(), MigrationError> {
        self.db
            .execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {MIGRATIONS_TABLE} (
                        version INTEGER PRIMARY KEY,
                        name TEXT NOT NULL,
                        applied_at TEXT NOT NULL DEFAULT (datetime('now'))
                    )"
                ),
                (),
            )
            .await
            .map_err(|source| MigrationError::Execution {
                version: 0,
                name: MIGRATIONS_TABLE.to_string(),
                source,
            })?;
        Ok(())
    }

    async fn apply_migration(&self, migration: &Migration) -> Result<(), MigrationError> {
        let execution_error = |source| MigrationError::Execution {
            version: migration.version,
            name: migration.name.clone(),
            source,
        };

        debug!(version = migration.version, name = %migration.name, "applying migration");
        let tx = self.db.transaction().await.map_err(execution_error)?;
        match Self::apply_statements(&tx, migration).await {
            Ok(()) => tx.commit().await.map_err(execution_error),
            Err(source) => {
                if let Err(rollback_error) = tx.rollback().await {
                    warn!(
                        version = migration.version,
                        error = %rollback_error,
                        "failed to roll back migration"
                    );
                }
                Err(execution_error(source))
            }
        }
    }

    async fn apply_statements(tx: &Transaction, migration: &Migration) -> Result<(), SqliteError> {
        tx.execute_batch(&migration.sql).await?;
        tx.execute(
            &format!("INSERT INTO {MIGRATIONS_TABLE} (version, name) VALUES (?1, ?2)"),
            Params::Positional(vec![
                Value::Integer(i64::from(migration.version)),
                Value::Text(migration.name.clone()),
            ]),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ConnectionTarget, SCHEMA};

    async fn memory_db() -> Database {
        Database::connect(ConnectionTarget::Ephemeral)
            .await
            .expect("failed to open in-memory database")
    }

    #[test]
    fn test_parse_file_name() {
        assert_eq!(
            Migration::parse_file_name("0002_bookmark_lists.sql").unwrap(),
            (2, "bookmark_lists".to_string())
        );
        for bad in ["bookmarks.sql", "0001.sql", "abcd_name.sql", "0000_zero.sql", "_x.sql"] {
            assert!(
                matches!(
                    Migration::parse_file_name(bad),
                    Err(MigrationError::InvalidFileName(_))
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_embedded_matches_schema_descriptor() {
        let set = MigrationSet::embedded();
        assert_eq!(set.latest_version(), SCHEMA.version);
        assert_eq!(set.len(), 3);
        let versions: Vec<u32> = set.iter().map(|m| m.version).collect();
        assert_eq!(versions, vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicate_versions_rejected() {
        let result = MigrationSet::new(vec![
            Migration::new(1, "a", "SELECT 1;"),
            Migration::new(1, "b", "SELECT 1;"),
        ]);
        assert!(matches!(result, Err(MigrationError::DuplicateVersion(1))));
    }

    #[test]
    fn test_from_dir_sorts_and_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("0002_second.sql"), "CREATE TABLE b (id INTEGER);").unwrap();
        std::fs::write(dir.path().join("0001_first.sql"), "CREATE TABLE a (id INTEGER);").unwrap();
        std::fs::write(dir.path().join("README.md"), "notes").unwrap();

        let set = MigrationSet::from_dir(dir.path()).unwrap();
        let names: Vec<&str> = set.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(set.latest_version(), 2);
    }

    #[test]
    fn test_from_dir_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = MigrationSet::from_dir(dir.path().join("absent"));
        assert!(matches!(result, Err(MigrationError::ReadDir { .. })));
    }

    #[tokio::test]
    async fn test_run_embedded_migrations() {
        let db = memory_db().await;
        let migrator = Migrator::new(&db);

        let applied = migrator.run(&MigrationSet::embedded()).await.unwrap();
        assert_eq!(applied, 3);
        assert_eq!(migrator.current_version().await.unwrap(), 3);

        let tables = db.table_names().await.unwrap();
        for table in SCHEMA.tables {
            assert!(tables.contains(&(*table).to_string()), "table {table} should exist");
        }
    }

    #[tokio::test]
    async fn test_rerun_is_noop() {
        let db = memory_db().await;
        let migrator = Migrator::new(&db);
        migrator.run(&MigrationSet::embedded()).await.unwrap();

        assert_eq!(migrator.run(&MigrationSet::embedded()).await.unwrap(), 0);
        let applied = migrator.applied().await.unwrap();
        assert_eq!(applied.len(), 3);
        assert_eq!(applied[0].name, "initial_schema");
    }

    #[tokio::test]
    async fn test_version_reads_leave_database_untouched() {
        let db = memory_db().await;
        let migrator = Migrator::new(&db);

        assert_eq!(migrator.current_version().await.unwrap(), 0);
        assert!(migrator.applied().await.unwrap().is_empty());

        let mut rows = db
            .query("SELECT COUNT(*) FROM sqlite_master", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_version_is_reported() {
        let db = memory_db().await;
        let migrator = Migrator::new(&db);
        migrator.run(&MigrationSet::default()).await.unwrap();
        db.execute(
            &format!("INSERT INTO {MIGRATIONS_TABLE} (version, name) VALUES (-3, 'corrupt')"),
            (),
        )
        .await
        .unwrap();

        assert!(matches!(
            migrator.applied().await,
            Err(MigrationError::VersionCheck(SqliteError { ref code, .. })) if code == "SQLITE_MISMATCH"
        ));
    }

    #[tokio::test]
    async fn test_failed_migration_is_not_recorded() {
        let db = memory_db().await;
        let migrator = Migrator::new(&db);
        let set = MigrationSet::new(vec![
            Migration::new(1, "good", "CREATE TABLE a (id INTEGER);"),
            Migration::new(2, "bad", "CREATE TABLE b (id INTEGER); NOT VALID SQL;"),
        ])
        .unwrap();

        let err = migrator.run(&set).await.unwrap_err();
        assert!(matches!(err, MigrationError::Execution { version: 2, .. }));
        assert_eq!(migrator.current_version().await.unwrap(), 1);
        assert_eq!(db.table_names().await.unwrap(), vec!["a".to_string()]);
    }
}
