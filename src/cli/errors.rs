//! CLI-specific error types
//!
//! All CLI errors end the process with a non-zero exit status.

use std::io;

use thiserror::Error;

use crate::filter::FilterError;
use crate::predicate::PredicateParseError;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file error
    #[error("{0}")]
    Config(String),

    /// I/O error (files, stdin/stdout)
    #[error("{0}")]
    Io(#[from] io::Error),

    /// Malformed document input
    #[error("invalid document input: {0}")]
    Input(String),

    /// Predicate could not be parsed
    #[error(transparent)]
    Predicate(#[from] PredicateParseError),

    /// Filter operation failed
    #[error(transparent)]
    Filter(#[from] FilterError),
}

impl CliError {
    /// Config error
    pub fn config(msg: impl Into<String>) -> Self {
        CliError::Config(msg.into())
    }

    /// Input error
    pub fn input(msg: impl Into<String>) -> Self {
        CliError::Input(msg.into())
    }

    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "DOCFILTER_CLI_CONFIG_ERROR",
            CliError::Io(_) => "DOCFILTER_CLI_IO_ERROR",
            CliError::Input(_) => "DOCFILTER_CLI_INPUT_ERROR",
            CliError::Predicate(err) => err.code(),
            CliError::Filter(err) => err.code(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            return CliError::Io(e.into());
        }
        CliError::input(format!("JSON error: {}", e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
