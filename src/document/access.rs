//! Field accessor
//!
//! Resolves a `FieldPath` inside a document. Absence is an outcome here, never
//! an error: the accessor is total and side-effect free.

use serde_json::Value;

use super::path::{FieldPath, PathStep};

/// Outcome of resolving a path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AccessResult<'a> {
    /// The path resolved. The value may be `null`.
    Found(&'a Value),
    /// Some step of the path could not be followed
    Missing,
}

impl<'a> AccessResult<'a> {
    pub fn is_found(&self) -> bool {
        matches!(self, AccessResult::Found(_))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, AccessResult::Missing)
    }

    /// Returns the found value, if any
    pub fn found(self) -> Option<&'a Value> {
        match self {
            AccessResult::Found(value) => Some(value),
            AccessResult::Missing => None,
        }
    }
}

/// Resolves `path` against `document`.
///
/// A key step only descends into objects and an index step only into arrays;
/// anything else (including `null`) stops the walk with `Missing`.
pub fn access<'a>(document: &'a Value, path: &FieldPath) -> AccessResult<'a> {
    let mut current = document;

    for step in path.steps() {
        let next = match (step, current) {
            (PathStep::Key(key), Value::Object(map)) => map.get(key),
            (PathStep::Index(index), Value::Array(items)) => items.get(*index),
            _ => None,
        };

        match next {
            Some(value) => current = value,
            None => return AccessResult::Missing,
        }
    }

    AccessResult::Found(current)
}
