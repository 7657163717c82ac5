//! Engine tuning directives applied to local database files.

use std::fmt;
use std::time::Duration;

use super::config::DurabilityMode;

/// Page cache budget in KiB (64 MiB).
pub const CACHE_SIZE_KIB: i64 = 64 * 1024;

/// How long a connection waits on a locked database before failing.
pub const BUSY_TIMEOUT: Duration = Duration::from_millis(20_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalMode {
    Wal,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Synchronous {
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempStore {
    Memory,
}

/// A single engine tuning instruction. Each renders to one `PRAGMA` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    JournalMode(JournalMode),
    Synchronous(Synchronous),
    ForeignKeys(bool),
    TempStore(TempStore),
    /// Page cache size in KiB; rendered as a negative `cache_size`
    CacheSize { kibibytes: i64 },
    BusyTimeout(Duration),
}

impl Directive {
    /// Name of the pragma this directive sets.
    pub const fn pragma(&self) -> &'static str {
        match self {
            Self::JournalMode(_) => "journal_mode",
            Self::Synchronous(_) => "synchronous",
            Self::ForeignKeys(_) => "foreign_keys",
            Self::TempStore(_) => "temp_store",
            Self::CacheSize { .. } => "cache_size",
            Self::BusyTimeout(_) => "busy_timeout",
        }
    }

    /// Whether the setting lasts only for the session it was applied on.
    ///
    /// Journal mode is stored in the database file; everything else has to be
    /// applied again on each new session.
    pub const fn is_connection_scoped(&self) -> bool {
        !matches!(self, Self::JournalMode(_))
    }

    pub fn to_sql(&self) -> String {
        let value = match self {
            Self::JournalMode(JournalMode::Wal) => "WAL".to_string(),
            Self::JournalMode(JournalMode::Delete) => "DELETE".to_string(),
            Self::Synchronous(Synchronous::Normal) => "NORMAL".to_string(),
            Self::ForeignKeys(true) => "ON".to_string(),
            Self::ForeignKeys(false) => "OFF".to_string(),
            Self::TempStore(TempStore::Memory) => "MEMORY".to_string(),
            Self::CacheSize { kibibytes } => format!("-{kibibytes}"),
            Self::BusyTimeout(timeout) => timeout.as_millis().to_string(),
        };
        format!("PRAGMA {} = {value}", self.pragma())
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Ordered directive plan for a local database file.
///
/// The journal mode always comes first and the busy timeout last; callers must
/// apply the plan in exactly this order.
pub fn local_file_plan(durability: DurabilityMode) -> Vec<Directive> {
    let mut plan = match durability {
        DurabilityMode::WriteAheadLog => vec![
            Directive::JournalMode(JournalMode::Wal),
            Directive::Synchronous(Synchronous::Normal),
        ],
        DurabilityMode::RollbackJournal => vec![Directive::JournalMode(JournalMode::Delete)],
    };
    plan.extend([
        Directive::ForeignKeys(true),
        Directive::TempStore(TempStore::Memory),
        Directive::CacheSize {
            kibibytes: CACHE_SIZE_KIB,
        },
        Directive::BusyTimeout(BUSY_TIMEOUT),
    ]);
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(durability: DurabilityMode) -> Vec<String> {
        local_file_plan(durability).iter().map(Directive::to_sql).collect()
    }

    #[test]
    fn test_wal_plan_order() {
        assert_eq!(
            rendered(DurabilityMode::WriteAheadLog),
            vec![
                "PRAGMA journal_mode = WAL",
                "PRAGMA synchronous = NORMAL",
                "PRAGMA foreign_keys = ON",
                "PRAGMA temp_store = MEMORY",
                "PRAGMA cache_size = -65536",
                "PRAGMA busy_timeout = 20000",
            ]
        );
    }

    #[test]
    fn test_rollback_plan_order() {
        assert_eq!(
            rendered(DurabilityMode::RollbackJournal),
            vec![
                "PRAGMA journal_mode = DELETE",
                "PRAGMA foreign_keys = ON",
                "PRAGMA temp_store = MEMORY",
                "PRAGMA cache_size = -65536",
                "PRAGMA busy_timeout = 20000",
            ]
        );
    }

    #[test]
    fn test_only_journal_mode_outlives_the_session() {
        let scoped: Vec<&str> = local_file_plan(DurabilityMode::WriteAheadLog)
            .iter()
            .filter(|d| d.is_connection_scoped())
            .map(Directive::pragma)
            .collect();
        assert_eq!(
            scoped,
            vec!["synchronous", "foreign_keys", "temp_store", "cache_size", "busy_timeout"]
        );
    }

    #[test]
    fn test_rollback_plan_never_sets_synchronous() {
        let plan = local_file_plan(DurabilityMode::RollbackJournal);
        assert!(!plan.iter().any(|d| d.pragma() == "synchronous"));
        assert!(!plan.contains(&Directive::JournalMode(JournalMode::Wal)));
    }
}
