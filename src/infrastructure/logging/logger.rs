use super::config::{LogConfig, LogFormat, RotationPolicy};
use crate::domain::errors::ConfigError;
use anyhow::{Context, Result};
use std::io;
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "keepdb.log";

/// Logger implementation using tracing
pub struct LoggerImpl {
    _guard: Option<WorkerGuard>,
}

impl LoggerImpl {
    /// Install the global subscriber described by `config`.
    ///
    /// The returned value owns the file writer's guard and must be kept alive
    /// for as long as logs should be flushed to disk.
    pub fn init(config: &LogConfig) -> Result<Self> {
        let default_level = parse_log_level(&config.level)?;
        let env_filter = EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy();

        // File output is always JSON.
        let (file_layer, guard) = match config.log_dir {
            Some(ref log_dir) => {
                let (writer, guard) =
                    tracing_appender::non_blocking(file_appender(log_dir, config.rotation));
                let layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_current_span(true)
                    .with_target(true)
                    .with_thread_ids(true);
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        let json_layer = (config.enable_stderr && config.format == LogFormat::Json).then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_current_span(true)
                .with_target(true)
        });

        let pretty_layer = (config.enable_stderr && config.format == LogFormat::Pretty).then(|| {
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
        });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(json_layer)
            .with(pretty_layer)
            .try_init()
            .context("a global tracing subscriber is already installed")?;

        tracing::debug!(
            level = %config.level,
            format = ?config.format,
            file_output = config.log_dir.is_some(),
            "logger initialized"
        );

        Ok(Self { _guard: guard })
    }
}

fn file_appender(log_dir: &Path, rotation: RotationPolicy) -> RollingFileAppender {
    match rotation {
        RotationPolicy::Daily => rolling::daily(log_dir, LOG_FILE_NAME),
        RotationPolicy::Hourly => rolling::hourly(log_dir, LOG_FILE_NAME),
        RotationPolicy::Never => rolling::never(log_dir, LOG_FILE_NAME),
    }
}

/// Parse log level string to Level
pub fn parse_log_level(level: &str) -> Result<Level, ConfigError> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(ConfigError::InvalidLogLevel(level.to_string())),
    }
}
