//! Connection bootstrap.
//!
//! Resolves the backend, opens it, and applies the local-file directive plan.
//! Also builds the isolated in-memory databases used by test harnesses.

use tracing::{debug, info, instrument};

use crate::adapters::libsql::{Database, MigrationSet, Migrator};
use crate::domain::errors::{DatabaseError, DatabaseResult};
use crate::domain::models::{
    local_file_plan, ConnectionTarget, DatabaseSettings, Directive, DurabilityMode,
};
use crate::domain::ports::DirectiveExecutor;

/// Lifecycle of the process-wide connection.
///
/// `Ready` is terminal. A failed bootstrap stays in the state where it failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BootstrapState {
    #[default]
    Uninitialized,
    Resolving,
    ConfiguringDirectives,
    Ready,
}

/// Drives one connection through resolution, directive application and
/// readiness.
#[derive(Debug, Default)]
pub struct Bootstrapper {
    state: BootstrapState,
    applied: Vec<Directive>,
}

impl Bootstrapper {
    pub const fn new() -> Self {
        Self {
            state: BootstrapState::Uninitialized,
            applied: Vec::new(),
        }
    }

    pub const fn state(&self) -> BootstrapState {
        self.state
    }

    /// Directives applied so far, in application order.
    pub fn applied_directives(&self) -> &[Directive] {
        &self.applied
    }

    /// Resolve, connect and configure a database for `settings`.
    #[instrument(skip_all, err)]
    pub async fn run(&mut self, settings: &DatabaseSettings) -> DatabaseResult<Database> {
        let target = self.resolve(settings)?;
        let db = Database::connect(target).await?;
        let target = db.target().clone();
        self.configure(&db, &target, settings.durability()).await?;
        info!(%target, directives = self.applied.len(), "database ready");
        Ok(db)
    }

    /// Pick the connection target. Performs no I/O.
    pub fn resolve(&mut self, settings: &DatabaseSettings) -> DatabaseResult<ConnectionTarget> {
        self.transition(BootstrapState::Resolving);
        let target = ConnectionTarget::resolve(settings)?;
        info!(%target, "resolved database target");
        Ok(target)
    }

    /// Apply the directive plan for `target` and mark the bootstrap ready.
    ///
    /// Remote servers are left untouched and in-memory databases need no
    /// tuning; only local files receive directives. The first failing
    /// directive aborts the sequence.
    pub async fn configure<E>(
        &mut self,
        executor: &E,
        target: &ConnectionTarget,
        durability: DurabilityMode,
    ) -> DatabaseResult<()>
    where
        E: DirectiveExecutor + ?Sized,
    {
        match target {
            ConnectionTarget::Remote { .. } => {
                debug!("remote backend, skipping directives");
            }
            ConnectionTarget::Ephemeral => {}
            ConnectionTarget::LocalFile { .. } => {
                self.transition(BootstrapState::ConfiguringDirectives);
                for directive in local_file_plan(durability) {
                    debug!(%directive, "applying directive");
                    executor
                        .apply(&directive)
                        .await
                        .map_err(|source| DatabaseError::Directive { directive, source })?;
                    self.applied.push(directive);
                }
            }
        }

        self.transition(BootstrapState::Ready);
        Ok(())
    }

    fn transition(&mut self, next: BootstrapState) {
        debug!(from = ?self.state, to = ?next, "bootstrap state");
        self.state = next;
    }
}

/// Create an isolated in-memory database.
///
/// With `run_migrations` the embedded migration history is replayed first;
/// otherwise the database is empty. Directives are never applied.
pub async fn create_ephemeral(run_migrations: bool) -> DatabaseResult<Database> {
    if run_migrations {
        create_ephemeral_with(&MigrationSet::embedded()).await
    } else {
        let db = Database::connect(ConnectionTarget::Ephemeral).await?;
        debug!("ephemeral database created");
        Ok(db)
    }
}

/// Create an isolated in-memory database with `migrations` replayed into it.
///
/// If any migration fails the database is dropped and only the error is returned.
pub async fn create_ephemeral_with(migrations: &MigrationSet) -> DatabaseResult<Database> {
    let db = Database::connect(ConnectionTarget::Ephemeral).await?;
    let applied = Migrator::new(&db).run(migrations).await?;
    debug!(applied, "ephemeral database created");
    Ok(db)
}
