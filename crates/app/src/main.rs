use std::{
    io::{self, IsTerminal},
    process::ExitCode,
};

use clap::Parser;
use engine::JobStore;

use crate::{
    cli::{Cli, Command},
    error::Result,
    settings::Settings,
};

mod chart;
mod cli;
mod error;
mod menu;
mod output;
mod settings;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load(&cli) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {err}");
            return err.exit_code();
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "jobtracker={level},engine={level}",
            level = settings.level
        ))
        .with_writer(io::stderr)
        .init();

    match run(cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("error: {err}");
            err.exit_code()
        }
    }
}

fn run(cli: Cli, settings: &Settings) -> Result<()> {
    let mut store = JobStore::open(&settings.data_file)?;
    tracing::info!("using data file {}", store.path().display());

    let today = chrono::Local::now().date_naive();
    let command = cli.command.unwrap_or(Command::Menu);

    let stdin = io::stdin();
    let stdout = io::stdout();
    cli::execute(
        command,
        &mut store,
        settings,
        today,
        &mut stdin.lock(),
        &mut stdout.lock(),
    )
}

/// Whether stdout is an interactive terminal, i.e. the full-screen chart can
/// be shown.
pub(crate) fn stdout_is_terminal() -> bool {
    io::stdout().is_terminal()
}
