//! Opaque function predicates
//!
//! The function receives a `FieldContext` instead of the raw document. Every
//! lookup through `FieldContext::field` that misses is recorded, so a miss
//! surfaces as a `MissingFieldFault` even when the function catches the error
//! and returns a plain boolean.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::document::{access, type_name, FieldPath};

use super::errors::{EvalResult, MissingFieldFault, PredicateTypeError};

/// Signature of a function predicate
pub type PredicateFn = dyn Fn(&FieldContext<'_>) -> EvalResult<bool> + Send + Sync;

/// Per-evaluation view of one document
pub struct FieldContext<'a> {
    document: &'a Value,
    first_missing: RefCell<Option<FieldPath>>,
}

impl<'a> FieldContext<'a> {
    pub fn new(document: &'a Value) -> Self {
        Self {
            document,
            first_missing: RefCell::new(None),
        }
    }

    /// The whole document. Lookups made directly on it bypass fault tracking.
    pub fn document(&self) -> &'a Value {
        self.document
    }

    /// Resolves a field, raising (and recording) a fault when it is missing
    pub fn field(&self, path: impl Into<FieldPath>) -> Result<&'a Value, MissingFieldFault> {
        let path = path.into();
        match access(self.document, &path).found() {
            Some(value) => Ok(value),
            None => {
                let fault = MissingFieldFault::at(&path);
                let mut first = self.first_missing.borrow_mut();
                if first.is_none() {
                    *first = Some(path);
                }
                Err(fault)
            }
        }
    }

    /// Resolves a boolean field. A non-boolean value is a type error.
    pub fn bool_field(&self, path: impl Into<FieldPath>) -> EvalResult<bool> {
        let path = path.into();
        match self.field(&path)? {
            Value::Bool(b) => Ok(*b),
            other => Err(PredicateTypeError::NotBoolean {
                context: "function field",
                actual: type_name(other),
            }
            .into()),
        }
    }

    /// Looks a field up without raising. Absence is an answer here.
    pub fn try_field(&self, path: impl Into<FieldPath>) -> Option<&'a Value> {
        access(self.document, &path.into()).found()
    }

    pub fn has_field(&self, path: impl Into<FieldPath>) -> bool {
        self.try_field(path).is_some()
    }

    fn into_first_missing(self) -> Option<FieldPath> {
        self.first_missing.into_inner()
    }
}

/// A named, shareable function predicate
#[derive(Clone)]
pub struct FnPredicate {
    name: String,
    func: Arc<PredicateFn>,
}

impl FnPredicate {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&FieldContext<'_>) -> EvalResult<bool> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the function against `document`
    pub fn evaluate(&self, document: &Value) -> EvalResult<bool> {
        let context = FieldContext::new(document);
        let outcome = (self.func)(&context);

        match (outcome, context.into_first_missing()) {
            (Ok(_), Some(path)) => {
                debug!(
                    function = %self.name,
                    path = %path,
                    "function predicate returned a value after a missing field"
                );
                Err(MissingFieldFault::at(path).into())
            }
            (outcome, _) => outcome,
        }
    }
}

impl fmt::Debug for FnPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPredicate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
