//! WxBuddy command-line client.

mod app_services;
mod cli;
mod commands;
mod error_mapping;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use app_services::AppServices;
use cli::{Cli, Commands};
use wxbuddy_core::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    if let Err(e) = wxbuddy_core::init(level) {
        eprintln!("Warning: {:#}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let err = error_mapping::into_app_error(e);
            tracing::debug!("Command failed: {:?}", err);
            eprintln!("Error: {}", error_mapping::describe(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let (config, _validation) = Config::load_validated(cli.config.as_deref())?;
    let services = AppServices::from_config(config)?;
    tracing::debug!("{:?}", services);

    match cli.command {
        Commands::Search(args) => commands::cmd_search(&services, args, cli.json).await,
        Commands::Browse(args) => commands::cmd_browse(&services, args).await,
        Commands::Weather(args) => commands::cmd_weather(&services, args, cli.json).await,
        Commands::Locate(args) => commands::cmd_locate(&services, args, cli.json).await,
        Commands::History { clear } => commands::cmd_history(&services, clear, cli.json),
    }
}
