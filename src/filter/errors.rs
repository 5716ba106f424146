//! Filter error types
//!
//! Error codes:
//! - FILTER_FIELD_ACCESS: field access error during filter (RaiseOnMissing only)
//! - FILTER_PREDICATE_TYPE: malformed predicate met at evaluation time
//! - FILTER_INVALID_PREDICATE: predicate rejected before evaluation
//! - FILTER_SOURCE: the input sequence failed to produce a document

use thiserror::Error;

use crate::document::FieldPath;
use crate::predicate::{MissingFieldFault, PredicateTypeError};

/// Errors surfaced by a filter operation. Each one terminates the operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("field access error during filter at document {position}: {fault}")]
    FieldAccess {
        fault: MissingFieldFault,
        position: usize,
    },

    #[error("predicate type error at document {position}: {error}")]
    PredicateType {
        error: PredicateTypeError,
        position: usize,
    },

    #[error("invalid predicate: {0}")]
    InvalidPredicate(String),

    #[error("source error at document {position}: {message}")]
    Source { message: String, position: usize },
}

impl FilterError {
    /// Creates a source error for upstream sequences
    pub fn source(position: usize, message: impl Into<String>) -> Self {
        FilterError::Source {
            message: message.into(),
            position,
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            FilterError::FieldAccess { .. } => "FILTER_FIELD_ACCESS",
            FilterError::PredicateType { .. } => "FILTER_PREDICATE_TYPE",
            FilterError::InvalidPredicate(_) => "FILTER_INVALID_PREDICATE",
            FilterError::Source { .. } => "FILTER_SOURCE",
        }
    }

    /// The offending field path, for field access errors that know it
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            FilterError::FieldAccess { fault, .. } => fault.path(),
            _ => None,
        }
    }

    /// Zero-based position of the document the operation stopped at
    pub fn position(&self) -> Option<usize> {
        match self {
            FilterError::FieldAccess { position, .. }
            | FilterError::PredicateType { position, .. }
            | FilterError::Source { position, .. } => Some(*position),
            FilterError::InvalidPredicate(_) => None,
        }
    }
}

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;
