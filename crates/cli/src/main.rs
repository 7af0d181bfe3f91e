//! `pipeline`: validate an onboarding document, manage its truststore and
//! run its steps.

mod cli;
mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    cli::init_tracing(&cli);
    commands::run(cli).await
}
