//! CLI definition and entrypoint.

use crate::{
    commands::{query, server},
    runner::CliRunner,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use txwatch_tracing::{FileInfo, LayerInfo, LogFormat, Tracer, TracerHandle, TxwatchTracer};

/// The main txwatch cli interface.
#[derive(Debug, Parser)]
#[command(author, version, about = "Tracks the transactions of Ethereum addresses", long_about = None)]
pub(crate) struct Cli {
    /// The command to run
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    logs: LogArgs,
}

/// Commands to be executed
#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Track subscribed addresses and serve them over JSON-RPC
    #[command(name = "server")]
    Server(server::Command),
    /// Print the current chain head
    #[command(name = "block-number")]
    BlockNumber(query::BlockNumberCommand),
    /// Print the transactions of an address
    #[command(name = "transactions")]
    Transactions(query::TransactionsCommand),
}

/// The log configuration.
#[derive(Debug, Args)]
#[command(next_help_heading = "Logging")]
pub(crate) struct LogArgs {
    /// The format of stdout logs.
    #[arg(
        long = "log.format",
        value_name = "FORMAT",
        global = true,
        default_value_t = LogFormat::Terminal
    )]
    format: LogFormat,

    /// Additional filter directives, e.g. `tracker::worker=trace`.
    #[arg(long = "log.filter", value_name = "DIRECTIVES", global = true, default_value = "")]
    filter: String,

    /// Also write JSON logs, rotated daily, to this directory.
    #[arg(long = "log.directory", value_name = "PATH", global = true)]
    directory: Option<PathBuf>,
}

impl LogArgs {
    /// Installs the global tracing subscriber.
    pub(crate) fn init_tracing(&self) -> eyre::Result<TracerHandle> {
        let mut tracer =
            TxwatchTracer::new().with_stdout(LayerInfo::new(self.format, self.filter.clone()));
        if let Some(directory) = &self.directory {
            tracer = tracer.with_file(
                FileInfo::new(directory.clone(), "txwatch.log").with_filters(self.filter.clone()),
            );
        }
        tracer.init()
    }
}

/// Parses the command line and runs the selected command.
pub(crate) fn run() -> eyre::Result<()> {
    let cli = Cli::parse();
    let _guard = cli.logs.init_tracing()?;

    let runner = CliRunner::try_default_runtime()?;
    match cli.command {
        Commands::Server(command) => runner.run_until_ctrl_c(command.execute()),
        Commands::BlockNumber(command) => runner.run_to_completion(command.execute()),
        Commands::Transactions(command) => runner.run_to_completion(command.execute()),
    }
}
