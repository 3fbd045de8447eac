// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! evo - graph transition simulator

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::simulate;
use std::path::PathBuf;

use crate::config::EvoConfig;

#[derive(Parser)]
#[command(
    name = "evo",
    version,
    about = "Evo - phased graph transition simulator"
)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run graph transitions driven by simulated animations
    Simulate(simulate::SimulateArgs),
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging();

    let config = EvoConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Simulate(args) => simulate::handle(args, config).await,
        Commands::Config => commands::config::handle(&config),
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
