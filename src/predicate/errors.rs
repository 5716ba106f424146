//! Predicate evaluation errors
//!
//! Error codes:
//! - FILTER_MISSING_FIELD (internal fault, resolved by the default policy)
//! - FILTER_PREDICATE_TYPE (always surfaced)
//! - FILTER_PREDICATE_PARSE (always surfaced)

use thiserror::Error;

use crate::document::FieldPath;

use super::expr::CompareOp;

/// A required field path could not be resolved.
///
/// This is a signal, not a user-visible failure: the filter's default policy
/// decides whether it becomes a skip, an include or an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe_missing(.path))]
pub struct MissingFieldFault {
    path: Option<FieldPath>,
}

fn describe_missing(path: &Option<FieldPath>) -> String {
    match path {
        Some(path) => format!("no attribute `{}` in document", path),
        None => "missing field in document".to_string(),
    }
}

impl MissingFieldFault {
    /// Fault for a known path
    pub fn at(path: impl Into<FieldPath>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Fault raised by opaque code that cannot name the path
    pub fn unknown() -> Self {
        Self { path: None }
    }

    /// Returns the offending path, if known
    pub fn path(&self) -> Option<&FieldPath> {
        self.path.as_ref()
    }

    pub fn code(&self) -> &'static str {
        "FILTER_MISSING_FIELD"
    }
}

/// A malformed predicate. Never resolved by the default policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateTypeError {
    /// A boolean position received something else
    #[error("expected BOOL in {context} but found {actual}")]
    NotBoolean {
        context: &'static str,
        actual: &'static str,
    },

    /// Ordering comparison between values with no common ordering
    #[error("cannot compare {lhs} {op} {rhs}")]
    Incomparable {
        op: CompareOp,
        lhs: &'static str,
        rhs: &'static str,
    },

    /// Raised by a function predicate
    #[error("function predicate `{name}` failed: {message}")]
    Function { name: String, message: String },
}

impl PredicateTypeError {
    /// Creates a failure for use inside function predicates
    pub fn function(name: impl Into<String>, message: impl Into<String>) -> Self {
        PredicateTypeError::Function {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        "FILTER_PREDICATE_TYPE"
    }
}

/// Outcome of a failed predicate evaluation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Missing(#[from] MissingFieldFault),

    #[error(transparent)]
    Type(#[from] PredicateTypeError),
}

impl EvalError {
    pub fn is_missing(&self) -> bool {
        matches!(self, EvalError::Missing(_))
    }

    pub fn code(&self) -> &'static str {
        match self {
            EvalError::Missing(fault) => fault.code(),
            EvalError::Type(err) => err.code(),
        }
    }
}

/// Result of evaluating a predicate against one document
pub type EvalResult<T> = Result<T, EvalError>;

/// The JSON wire form of a predicate could not be read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateParseError {
    #[error("invalid predicate JSON: {0}")]
    Json(String),

    #[error("pattern predicate must be a JSON object, found {0}")]
    PatternNotObject(&'static str),
}

impl PredicateParseError {
    pub fn code(&self) -> &'static str {
        "FILTER_PREDICATE_PARSE"
    }
}

impl From<serde_json::Error> for PredicateParseError {
    fn from(e: serde_json::Error) -> Self {
        PredicateParseError::Json(e.to_string())
    }
}
