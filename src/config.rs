//! Configuration loading and management.
//!
//! Configuration is loaded from multiple sources with the following
//! precedence (highest to lowest):
//!
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. `.sqint.toml` in current directory
//! 4. `~/.config/sqint/config.toml`
//! 5. Default values
//!
//! # Configuration File Format
//!
//! ```toml
//! [engine]
//! min_classifier_confidence = 0.5
//! sql_dialect = "ansi"         # ansi, postgres, mysql
//! fail_on = ["error"]          # severities that set a non-zero exit code
//!
//! [files]
//! patterns = ["*.py", "*.pyi"]
//! ignore_patterns = ["**/migrations/**"]
//! respect_gitignore = true
//! include_hidden = false
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `SQINT_DIALECT` | SQL dialect for validation |
//! | `SQINT_MIN_CONFIDENCE` | Classifier confidence threshold |

use std::{env, fs, path::PathBuf};

use serde::Deserialize;

use crate::{
    diagnostics::Severity,
    error::{AppResult, config_error, unknown_dialect_error},
    validate::SqlDialect
};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub files:  FilesConfig
}

/// Engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum classifier confidence for a payload to be validated
    pub min_classifier_confidence: f64,
    /// SQL dialect name (ansi, postgres, mysql)
    pub sql_dialect:               String,
    /// Severities that produce a failing exit code
    pub fail_on:                   Vec<String>
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_classifier_confidence: 0.5,
            sql_dialect:               String::from("ansi"),
            fail_on:                   vec![String::from("error")]
        }
    }
}

/// File enumeration configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Include glob patterns
    pub patterns:          Vec<String>,
    /// Exclude glob patterns
    pub ignore_patterns:   Vec<String>,
    pub respect_gitignore: bool,
    pub include_hidden:    bool
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            patterns:          vec![String::from("*.py"), String::from("*.pyi")],
            ignore_patterns:   Vec::new(),
            respect_gitignore: true,
            include_hidden:    false
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file in current directory (.sqint.toml)
    /// 3. Config file in home directory (~/.config/sqint/config.toml)
    /// 4. Default values
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("sqint")
                .join("config.toml");

            if home_config.exists() {
                config = Self::from_path(&home_config)?;
            }
        }

        let local_config = PathBuf::from(".sqint.toml");
        if local_config.exists() {
            config = Self::from_path(&local_config)?;
        }

        if let Ok(dialect) = env::var("SQINT_DIALECT") {
            config.engine.sql_dialect = dialect;
        }

        if let Ok(confidence) = env::var("SQINT_MIN_CONFIDENCE") {
            config.engine.min_classifier_confidence = confidence
                .parse()
                .map_err(|_| config_error(format!("Invalid SQINT_MIN_CONFIDENCE: {}", confidence)))?;
        }

        Ok(config)
    }

    fn from_path(path: &PathBuf) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| config_error(format!("Failed to read config file: {}", e)))?;
        toml::from_str(&content).map_err(|e| config_error(format!("Invalid config file: {}", e)))
    }

    /// Resolve the dialect name; an unknown dialect is fatal at startup.
    pub fn dialect(&self) -> AppResult<SqlDialect> {
        SqlDialect::parse(&self.engine.sql_dialect)
            .ok_or_else(|| unknown_dialect_error(&self.engine.sql_dialect, &SqlDialect::supported()))
    }

    /// Resolve the fail_on severity names; unknown names are fatal.
    pub fn fail_on(&self) -> AppResult<Vec<Severity>> {
        self.engine
            .fail_on
            .iter()
            .map(|s| {
                Severity::parse(s)
                    .ok_or_else(|| config_error(format!("Unknown severity in fail_on: '{}'", s)))
            })
            .collect()
    }
}
