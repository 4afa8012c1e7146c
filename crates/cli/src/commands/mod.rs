pub mod config;
pub mod run;

use clap::Subcommand;
pub use run::RunArgs;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Push items from concurrent producers through a batcher and report
    /// what the flush handler saw.
    ///
    /// Example:
    ///   batch run --producers 8 --items 10000 --capacity 4096
    ///   BATCH_FLUSH_INTERVAL_MS=5 batch run --json
    Run(RunArgs),

    /// Show the batcher settings resolved from the environment.
    Config,
}
