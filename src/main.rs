use clap::Parser;

use blobvault::bootstrap::{init_tracing_subscriber, load_config, logging_config, run_command};
use blobvault::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let source = load_config(cli.config.as_deref())?;
    init_tracing_subscriber(&logging_config(&source)?)?;

    run_command(cli.command, &source)
}
