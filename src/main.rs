mod cli;
mod config;
mod dashboard;
mod error;
mod insights;
mod metrics;
mod output;
mod records;
mod sources;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting CycleLens - Issue Cycle-Time Insights Tool");
    cli.execute().await?;

    Ok(())
}
