pub mod bootstrap;
pub mod global;

pub use bootstrap::{create_ephemeral, create_ephemeral_with, BootstrapState, Bootstrapper};
pub use global::{database, initialize, initialize_from_env, is_ready};
