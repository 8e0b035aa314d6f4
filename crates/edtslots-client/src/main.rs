//! edtslots CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use edtslots_core::{TracingConfig, init_tracing};

use edtslots_client::cli::{Cli, Command, ConfigAction};
use edtslots_client::commands;
use edtslots_client::config::ClientConfig;
use edtslots_client::error::ClientResult;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };

    if let Command::Config { ref action } = cli.command {
        return match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        };
    }

    config.validate()?;
    let query = commands::query::availability_query(&config)?;

    match cli.command {
        Command::Slots { ref range } => commands::query::slots(&query, range),
        Command::Free {
            ref course,
            ref output,
        } => commands::query::free(&query, course, output).await,
        Command::Rooms {
            ref course,
            ref output,
        } => commands::query::rooms(&query, course, output).await,
        Command::Events {
            ref group,
            ref range,
            ref ics,
        } => commands::query::events(&query, group, range, ics.as_deref()).await,
        Command::Groups => commands::query::groups(&query),
        Command::Locations => commands::query::locations(&query),
        Command::Config { .. } => Ok(()),
    }
}
