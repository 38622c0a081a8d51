//! Console configuration
//!
//! A single [`ConsoleConfig`] is loaded at startup and passed to whoever needs
//! it. It holds the backend base URL, classifier cutoffs, display settings and
//! the beta-user allow-list.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Explicit path (`--config`), or the override in the data dir
//!    (~/.local/share/nota/config/console.toml) when it exists
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Environment variables are applied last:
//! - `NOTA_BACKEND_URL` replaces `backend.base_url`
//! - `NOTA_BACKEND_TIMEOUT_SECS` replaces `backend.timeout_secs`

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classifier::{ClassifierThresholds, ExpenseClassifier};
use crate::error::{Error, Result};
use crate::format::CurrencyFormat;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/console.toml");

/// Where the active configuration came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Embedded defaults
    #[default]
    Embedded,
    /// Override file in the platform data directory
    Override(PathBuf),
    /// Path given on the command line
    Explicit(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Embedded => write!(f, "embedded defaults"),
            ConfigSource::Override(path) | ConfigSource::Explicit(path) => {
                write!(f, "{}", path.display())
            }
        }
    }
}

/// Connection settings for the bookkeeping backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Path of the monthly expense aggregation endpoint
    pub expense_summary_path: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
            expense_summary_path: "/api/reports/expenses/monthly".to_string(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Display settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub locale: String,
    pub currency: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let fmt = CurrencyFormat::default();
        Self {
            locale: fmt.locale,
            currency: fmt.currency,
        }
    }
}

impl DisplayConfig {
    pub fn currency_format(&self) -> CurrencyFormat {
        CurrencyFormat::new(&self.locale, &self.currency)
    }
}

/// Feature gating for early-access users
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureAccess {
    /// Emails allowed into beta features
    pub beta_users: Vec<String>,
}

impl FeatureAccess {
    /// Case-insensitive membership check
    pub fn is_beta_user(&self, email: &str) -> bool {
        let email = email.trim();
        !email.is_empty()
            && self
                .beta_users
                .iter()
                .any(|u| u.trim().eq_ignore_ascii_case(email))
    }
}

/// Complete console configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub backend: BackendConfig,
    pub classifier: ClassifierThresholds,
    pub display: DisplayConfig,
    pub features: FeatureAccess,
    #[serde(skip)]
    pub source: ConfigSource,
}

impl ConsoleConfig {
    /// Load configuration, then apply environment overrides
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = load_config(explicit_path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ConsoleConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("NOTA_BACKEND_URL").filter(|s| !s.trim().is_empty()) {
            debug!(url = %url, "Backend URL overridden by NOTA_BACKEND_URL");
            self.backend.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup("NOTA_BACKEND_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.backend.timeout_secs = secs,
                Err(_) => warn!(value = %raw, "Ignoring invalid NOTA_BACKEND_TIMEOUT_SECS"),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.backend.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "backend.base_url must be an http(s) URL, got '{}'",
                self.backend.base_url
            )));
        }
        if self.backend.timeout_secs == 0 {
            return Err(Error::Config(
                "backend.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if !self.backend.expense_summary_path.starts_with('/') {
            return Err(Error::Config(format!(
                "backend.expense_summary_path must start with '/', got '{}'",
                self.backend.expense_summary_path
            )));
        }
        self.classifier.validate()
    }

    /// Classifier built from the configured thresholds
    pub fn classifier(&self) -> ExpenseClassifier {
        ExpenseClassifier::new(self.classifier)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("nota").join("config").join("console.toml"))
}

/// Load configuration (explicit or override first, then embedded default)
fn load_config(explicit_path: Option<&Path>) -> Result<ConsoleConfig> {
    let (content, source) = if let Some(path) = explicit_path {
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "Config file {}",
                path.display()
            )));
        }
        (
            read_config_file(path)?,
            ConfigSource::Explicit(path.to_path_buf()),
        )
    } else {
        match default_config_path() {
            Some(path) if path.exists() => {
                (read_config_file(&path)?, ConfigSource::Override(path))
            }
            _ => (DEFAULT_CONFIG.to_string(), ConfigSource::Embedded),
        }
    };

    let mut config: ConsoleConfig = toml::from_str(&content)?;
    debug!(source = %source, "Loaded console config");
    config.source = source;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_embedded_default_parses() {
        let config = ConsoleConfig::from_toml_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.classifier, ClassifierThresholds::default());
        assert_eq!(config.backend, BackendConfig::default());
        assert_eq!(config.display.locale, "it-IT");
        assert!(config.features.beta_users.is_empty());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = ConsoleConfig::from_toml_str(
            r#"
[classifier]
variability_ratio = 3.0
"#,
        )
        .unwrap();
        assert_eq!(config.classifier.variability_ratio, 3.0);
        assert_eq!(config.classifier.sparsity_threshold, 0.25);
        assert_eq!(config.backend.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let result = ConsoleConfig::from_toml_str(
            r#"
[classifier]
occasional_max_active_months = 10
"#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_backend_url_rejected() {
        let result = ConsoleConfig::from_toml_str(
            r#"
[backend]
base_url = "backend.local"
"#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let result = ConsoleConfig::from_toml_str("[backend\nbase_url = 1");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("NOTA_BACKEND_URL", " https://api.example.com "),
            ("NOTA_BACKEND_TIMEOUT_SECS", "5"),
        ]
        .into_iter()
        .collect();

        let mut config = ConsoleConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.backend.base_url, "https://api.example.com");
        assert_eq!(config.backend.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_timeout_override_ignored() {
        let mut config = ConsoleConfig::default();
        config.apply_overrides(|k| {
            (k == "NOTA_BACKEND_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert_eq!(config.backend.timeout_secs, 30);
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[backend]
base_url = "http://10.0.0.2:9000"

[features]
beta_users = ["Alice@Example.com"]
"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.backend.base_url, "http://10.0.0.2:9000");
        assert_eq!(config.source, ConfigSource::Explicit(file.path().to_path_buf()));
        assert!(config.features.is_beta_user("alice@example.com"));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = load_config(Some(Path::new("/nonexistent/nota/console.toml")));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_beta_user_matching() {
        let access = FeatureAccess {
            beta_users: vec!["ops@studio.it".to_string()],
        };
        assert!(access.is_beta_user("OPS@studio.it"));
        assert!(access.is_beta_user(" ops@studio.it "));
        assert!(!access.is_beta_user("guest@studio.it"));
        assert!(!access.is_beta_user(""));
    }

    #[test]
    fn test_classifier_uses_configured_thresholds() {
        let mut config = ConsoleConfig::default();
        config.classifier.full_year_min_active_months = 6;
        assert_eq!(config.classifier().thresholds().full_year_min_active_months, 6);
    }
}
