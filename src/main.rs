// src/main.rs

use anyhow::Result;
use clap::Parser;
use rust2rpm::cli::Cli;

mod commands;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    commands::generate(&cli)
}
