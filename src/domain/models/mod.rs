pub mod config;
pub mod directive;
pub mod schema;
pub mod target;

pub use config::{Config, DatabaseSettings, DurabilityMode};
pub use directive::{
    local_file_plan, Directive, JournalMode, Synchronous, TempStore, BUSY_TIMEOUT, CACHE_SIZE_KIB,
};
pub use schema::{Schema, SCHEMA};
pub use target::ConnectionTarget;
