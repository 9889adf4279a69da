mod cli;
mod commands;
mod domain;
mod error;
mod logging;
mod presentation;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logger(cli.verbose);
    commands::run(cli)
}
