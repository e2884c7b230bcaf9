//! colab-links — post "Open in Colab" links for notebooks changed in a pull request.
//!
//! Meant to run as a CI step; every input comes from the runner's environment.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
