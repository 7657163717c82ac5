//! Infrastructure layer module
//!
//! - Connection bootstrap and the process-wide database
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod database;
pub mod logging;
