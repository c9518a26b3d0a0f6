mod cli;
mod commands;
mod config;
mod logging;

use std::process::ExitCode;

use clap::Parser;
use client_logging::{client_debug, client_error};
use convert_engine::ClientSession;

use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::logging::LogDestination;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            client_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    logging::initialize(
        LogDestination::from_file(cli.log_file, cli.quiet),
        client_logging::parse_level(&config.log_level),
    );
    client_debug!("effective config: {:?}", config);

    let session = ClientSession::connect(config.transport_settings(), config.notification_ttl)?;
    let outcome = commands::run(&session, cli.command).await;
    session.shutdown();
    outcome
}
