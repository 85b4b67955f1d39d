//! opsearch CLI entry point.

use clap::Parser;
use std::process::ExitCode;

use opsearch::cli::{self, Cli};
use opsearch::infrastructure::config::ConfigLoader;
use opsearch::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ConfigLoader::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            let err = anyhow::Error::new(e).context("Failed to load configuration");
            cli::report_error(&err, cli.json);
            return ExitCode::FAILURE;
        }
    };

    // The guard flushes file logs on drop, so it lives until main returns.
    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => logger,
        Err(e) => {
            cli::report_error(&e, cli.json);
            return ExitCode::FAILURE;
        }
    };

    match cli::dispatch(cli.command, config, cli.json).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "command failed");
            cli::report_error(&err, cli.json);
            ExitCode::from(u8::try_from(cli::exit_code(&err)).unwrap_or(1))
        }
    }
}
