//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `averages` - Category averages fetched from the backend
//! - `classify` - Local classification of one expense pattern
//! - `config` - Configuration loading and display
//! - `serve` - Web server command

pub mod averages;
pub mod classify;
pub mod config;
pub mod serve;

// Re-export command functions for main.rs
pub use averages::*;
pub use classify::*;
pub use config::*;
pub use serve::*;

use anyhow::Result;
use nota_core::Method;

/// Parse an optional `--method` value
pub fn parse_method(method: Option<&str>) -> Result<Option<Method>> {
    method
        .map(|m| m.parse::<Method>().map_err(anyhow::Error::msg))
        .transpose()
}

/// Truncate a string to max chars, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
