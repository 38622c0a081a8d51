//! Configuration commands and shared loading

use std::path::Path;

use anyhow::{Context, Result};
use nota_core::ConsoleConfig;

/// Load the console configuration (explicit path, user override or built-in)
pub fn load_console(path: Option<&Path>) -> Result<ConsoleConfig> {
    ConsoleConfig::load(path).context("Failed to load console configuration")
}

pub fn cmd_config(console: &ConsoleConfig) -> Result<()> {
    println!("⚙️  Configuration source: {}", console.source);
    if let Some(path) = nota_core::config::default_config_path() {
        println!("   User override path:   {}", path.display());
    }
    println!();
    println!("{}", toml::to_string_pretty(console)?);
    Ok(())
}
