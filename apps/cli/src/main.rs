//! pageforge CLI: turn one product record into FAQ, product and comparison pages.
//!
//! Reads a product JSON object, runs the generation pipeline, and writes the
//! three page documents as JSON files.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
