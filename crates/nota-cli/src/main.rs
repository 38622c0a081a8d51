//! Nota CLI - Bookkeeping console tools
//!
//! Usage:
//!   nota classify --total 2000 --month 3=2000   Classify an expense pattern
//!   nota averages --year 2025 --token T          Category averages from the backend
//!   nota config                                  Show the resolved configuration
//!   nota serve --port 3000                       Start the JSON API

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let console = commands::load_console(cli.config.as_deref())?;

    match cli.command {
        Commands::Classify {
            total,
            months,
            file,
            method,
            json,
        } => commands::cmd_classify(
            &console,
            total,
            &months,
            file.as_deref(),
            method.as_deref(),
            json,
        ),
        Commands::Averages {
            year,
            token,
            method,
            json,
        } => {
            commands::cmd_averages(
                &console,
                year,
                token.as_deref(),
                method.as_deref(),
                json,
            )
            .await
        }
        Commands::Config => commands::cmd_config(&console),
        Commands::Serve {
            port,
            host,
            allowed_origins,
        } => commands::cmd_serve(&console, &host, port, allowed_origins).await,
    }
}
