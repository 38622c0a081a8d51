//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Nota - Bookkeeping console tools
#[derive(Parser)]
#[command(name = "nota")]
#[command(about = "Expense pattern classifier for the Nota bookkeeping console", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Console configuration file (defaults to the user override, then the built-in config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify one annual expense pattern
    Classify {
        /// Annual total
        #[arg(short, long, allow_negative_numbers = true)]
        total: f64,

        /// Monthly expense as MONTH=AMOUNT (repeatable), e.g. --month 3=2000
        #[arg(short, long = "month", value_name = "M=AMOUNT")]
        months: Vec<String>,

        /// JSON file with a monthly breakdown ({"3": {"expense": 2000.0}})
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Force a method: occasional_budget, full_year, seasonal
        #[arg(long)]
        method: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Category averages for a year, from the bookkeeping backend
    Averages {
        /// Year to analyze (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Backend bearer token
        #[arg(long)]
        token: Option<String>,

        /// Force a method for every category
        #[arg(long)]
        method: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the resolved configuration and where it came from
    Config,

    /// Start the JSON API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Allowed CORS origin (repeatable)
        #[arg(long = "allowed-origin")]
        allowed_origins: Vec<String>,
    },
}
