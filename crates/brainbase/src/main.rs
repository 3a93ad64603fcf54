//! `brainbase-ops` entry point

mod cli;
mod handlers;

use std::process::ExitCode;

use brainbase_common::{LoggingOptions, RunId, init_logging, initialize_environment};
use clap::Parser;
use tracing::Instrument;

use crate::cli::Cli;
use crate::handlers::Outcome;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // .env first so RUST_LOG from the file applies
    if let Err(e) = initialize_environment(cli.env_file.as_deref()) {
        eprintln!("Failed to load env file: {e}");
        return ExitCode::from(handlers::EXIT_CONFIG);
    }

    let guards = match init_logging(&LoggingOptions {
        log_dir: cli.log_dir.clone(),
        disable_file: false,
        verbose: cli.verbose,
    }) {
        Ok(guards) => guards,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(handlers::EXIT_FAILURE);
        }
    };

    let run_id = RunId::new();
    let span = tracing::info_span!("run", run_id = %run_id, command = cli.command.name());
    if let Some(dir) = &guards.log_dir {
        tracing::debug!(parent: &span, log_dir = %dir.display(), "File logging enabled");
    }

    let code = match handlers::dispatch(cli).instrument(span).await {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::Failed) => ExitCode::from(handlers::EXIT_FAILURE),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(handlers::exit_code(&e))
        }
    };

    // flush both log writers before exiting
    drop(guards);
    code
}
