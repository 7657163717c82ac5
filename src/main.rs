//! keepdb CLI entry point.

use clap::Parser;

use keepdb::cli::commands::{load_config, migrate, status};
use keepdb::cli::{handle_error, Cli, Commands};
use keepdb::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Migrate(args) => migrate::execute(args, &config, cli.json).await,
        Commands::Status(args) => status::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
