#![warn(clippy::all, clippy::pedantic)]

use anyhow::{Context, Result};
use clap::Parser;
use nutrilens::Config;
use nutrilens::app;
use nutrilens::cli::Cli;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays pipeable JSON.
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_init()?,
    };
    app::dispatch::dispatch(cli, Arc::new(config)).await
}
