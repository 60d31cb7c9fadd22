//! talksite CLI — build-time tooling for the talk-listing site.
//!
//! Merges per-series talk files into `talks.json` and scaffolds the
//! per-series page directories.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
