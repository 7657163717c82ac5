//! Process-wide database connection.
//!
//! The connection is created once by [`initialize`] and lives until the
//! process exits. Concurrent callers of [`initialize`] wait on the same
//! bootstrap; if it fails the slot stays empty and the error is returned.

use tokio::sync::OnceCell;
use tracing::info;

use super::bootstrap::{BootstrapState, Bootstrapper};
use crate::adapters::libsql::Database;
use crate::domain::errors::{DatabaseError, DatabaseResult};
use crate::domain::models::DatabaseSettings;
use crate::infrastructure::config::ConfigLoader;

static DATABASE: OnceCell<Database> = OnceCell::const_new();

/// Bootstrap the process-wide connection from `settings`.
///
/// Runs at most once; later calls return the existing handle and ignore
/// their settings.
pub async fn initialize(settings: &DatabaseSettings) -> DatabaseResult<&'static Database> {
    DATABASE
        .get_or_try_init(|| async {
            let db = Bootstrapper::new().run(settings).await?;
            info!(target = %db.target(), "process-wide database initialized");
            Ok::<_, DatabaseError>(db)
        })
        .await
}

/// Load configuration from the environment and bootstrap the process-wide
/// connection.
pub async fn initialize_from_env() -> DatabaseResult<&'static Database> {
    if let Some(db) = DATABASE.get() {
        return Ok(db);
    }
    let config = ConfigLoader::load()?;
    initialize(&config.database).await
}

/// The process-wide connection, once [`initialize`] has completed.
pub fn database() -> DatabaseResult<&'static Database> {
    DATABASE.get().ok_or(DatabaseError::NotInitialized)
}

pub fn state() -> BootstrapState {
    if DATABASE.initialized() {
        BootstrapState::Ready
    } else {
        BootstrapState::Uninitialized
    }
}

pub fn is_ready() -> bool {
    state() == BootstrapState::Ready
}
