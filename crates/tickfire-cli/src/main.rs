mod cli;
mod error;
mod logging;
mod output;
mod place;

use clap::Parser;
use std::process::ExitCode;
use tracing::error;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_with_default(&cli.log_level);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            error!(error = %failure, exit_code = failure.exit_code(), "run failed");
            eprintln!("error: {failure}");
            ExitCode::from(failure.exit_code())
        }
    }
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let ticket = place::run(cli).await?;
    output::render(&ticket, cli.pretty)
}
