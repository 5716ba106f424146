//! Default policy for missing-field faults

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::predicate::MissingFieldFault;

use super::errors::{FilterError, FilterResult};

/// What a filter does with a document whose predicate raised a missing-field fault
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum DefaultPolicy {
    /// Drop the document silently
    #[default]
    #[serde(rename = "skip")]
    #[value(name = "skip")]
    Skip,

    /// Treat the predicate as vacuously true
    #[serde(rename = "include", alias = "include_on_missing")]
    #[value(name = "include")]
    IncludeOnMissing,

    /// Abort the whole filter operation
    #[serde(rename = "raise", alias = "raise_on_missing")]
    #[value(name = "raise")]
    RaiseOnMissing,
}

impl DefaultPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefaultPolicy::Skip => "skip",
            DefaultPolicy::IncludeOnMissing => "include",
            DefaultPolicy::RaiseOnMissing => "raise",
        }
    }

    /// Resolves a fault raised by the document at `position`
    pub fn resolve(&self, fault: MissingFieldFault, position: usize) -> FilterResult<Verdict> {
        debug!(policy = self.as_str(), position, fault = %fault, "resolving missing field");
        match self {
            DefaultPolicy::Skip => Ok(Verdict::MissingSkipped),
            DefaultPolicy::IncludeOnMissing => Ok(Verdict::MissingIncluded),
            DefaultPolicy::RaiseOnMissing => Err(FilterError::FieldAccess { fault, position }),
        }
    }
}

impl fmt::Display for DefaultPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-document outcome of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Predicate evaluated to true
    Matched,
    /// Predicate evaluated to false
    Rejected,
    /// Fault resolved by `Skip`
    MissingSkipped,
    /// Fault resolved by `IncludeOnMissing`
    MissingIncluded,
}

impl Verdict {
    /// Returns true if the document belongs in the output
    pub fn emits(&self) -> bool {
        matches!(self, Verdict::Matched | Verdict::MissingIncluded)
    }
}

/// Options recognized on a filter call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(default)]
    pub default: DefaultPolicy,
}

impl FilterOptions {
    pub fn with_default(default: DefaultPolicy) -> Self {
        Self { default }
    }
}
