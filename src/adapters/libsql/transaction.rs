//! Transaction capability handed to callers.

use libsql::params::IntoParams;
use tokio::sync::OwnedMutexGuard;

use super::rows::Rows;
use crate::domain::errors::SqliteError;

/// Open transaction on a [`Database`](super::Database).
///
/// File and remote transactions run on a session of their own. In-memory
/// transactions share the handle's only session and hold its lock until they
/// end. Dropping a transaction without calling [`commit`](Self::commit) rolls
/// the work back.
pub struct Transaction {
    // Declared before the guard so the rollback on drop runs while it is held.
    inner: libsql::Transaction,
    _serial: Option<OwnedMutexGuard<()>>,
}

impl Transaction {
    pub(crate) const fn new(
        inner: libsql::Transaction,
        serial: Option<OwnedMutexGuard<()>>,
    ) -> Self {
        Self {
            inner,
            _serial: serial,
        }
    }

    pub async fn execute(&self, sql: &str, params: impl IntoParams) -> Result<u64, SqliteError> {
        Ok(self.inner.execute(sql, params).await?)
    }

    /// Run several `;`-separated statements.
    pub async fn execute_batch(&self, sql: &str) -> Result<(), SqliteError> {
        self.inner.execute_batch(sql).await?;
        Ok(())
    }

    pub async fn query(&self, sql: &str, params: impl IntoParams) -> Result<Rows, SqliteError> {
        Ok(Rows::new(self.inner.query(sql, params).await?))
    }

    pub async fn commit(self) -> Result<(), SqliteError> {
        Ok(self.inner.commit().await?)
    }

    pub async fn rollback(self) -> Result<(), SqliteError> {
        Ok(self.inner.rollback().await?)
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction").finish_non_exhaustive()
    }
}
