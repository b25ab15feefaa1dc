mod buildkite;
mod cli;
mod config;
mod error;
mod output;
mod theme;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    info!("Starting buildbar");
    cli.execute().await?;

    Ok(())
}
