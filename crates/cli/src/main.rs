use std::process::ExitCode;

use clap::Parser;

mod commands;
mod printer;

use batch_runtime::{PROGRAM_NAME, logging};
use commands::Command;

#[derive(Debug, Parser)]
#[command(
    name = PROGRAM_NAME,
    version,
    about = "Drive a time-flushed batching buffer with concurrent producers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

fn main() -> ExitCode {
    logging::init().ok();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => commands::run::run(args),
        Command::Config => commands::config::run(),
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
