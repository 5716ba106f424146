//! Configuration file for the docfilter CLI
//!
//! ```json
//! {"default_policy": "skip", "max_expression_depth": 64, "log_level": "info"}
//! ```
//!
//! Every field is optional. Command-line flags override the file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::filter::{DefaultPolicy, DEFAULT_MAX_EXPRESSION_DEPTH};

use super::errors::{CliError, CliResult};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Policy for missing fields when `--default` is not given
    #[serde(default)]
    pub default_policy: DefaultPolicy,

    /// Deepest predicate accepted
    #[serde(default = "default_max_expression_depth")]
    pub max_expression_depth: usize,

    /// Log level used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_max_expression_depth() -> usize {
    DEFAULT_MAX_EXPRESSION_DEPTH
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_policy: DefaultPolicy::default(),
            max_expression_depth: default_max_expression_depth(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Loads `path` if given, otherwise the defaults
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> CliResult<()> {
        if self.max_expression_depth == 0 {
            return Err(CliError::config("max_expression_depth must be > 0"));
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(CliError::config(format!(
                "Invalid log_level: '{}'. Expected one of {}.",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}
