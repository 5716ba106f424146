//! Partial-document patterns
//!
//! A pattern lists field paths and the values expected there. Nested objects
//! match field by field (extra fields in the document are fine); a value
//! wrapped as `PatternValue::Literal` must equal the document's subtree
//! exactly. Scalars and arrays always compare as literals.

use serde_json::{Map, Value};

use crate::document::{access, type_name, values_equal, AccessResult, FieldPath, PathStep};

use super::errors::{EvalResult, MissingFieldFault, PredicateParseError};

/// Key of the explicit literal marker in the JSON form: `{"$literal": {...}}`
pub const LITERAL_MARKER: &str = "$literal";

/// Expected value for one pattern entry
#[derive(Debug, Clone, PartialEq)]
pub enum PatternValue {
    /// Matches an object field by field
    Partial(Pattern),
    /// Requires whole-subtree equality
    Literal(Value),
}

impl PatternValue {
    /// Converts a JSON value into a pattern value.
    ///
    /// Objects become partial patterns unless they are a literal marker.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut map) => {
                if map.len() == 1 && map.contains_key(LITERAL_MARKER) {
                    if let Some(inner) = map.remove(LITERAL_MARKER) {
                        return PatternValue::Literal(inner);
                    }
                }
                PatternValue::Partial(Pattern::from_map(map))
            }
            other => PatternValue::Literal(other),
        }
    }

    /// JSON form, inverse of `from_value`. `None` if a nested pattern has
    /// no faithful JSON form (see `Pattern::to_value`).
    pub fn to_value(&self) -> Option<Value> {
        match self {
            PatternValue::Partial(pattern) => {
                let value = pattern.to_value()?;
                if is_literal_marker(&value) {
                    return None;
                }
                Some(value)
            }
            PatternValue::Literal(value @ Value::Object(_)) => {
                let mut marker = Map::new();
                marker.insert(LITERAL_MARKER.to_string(), value.clone());
                Some(Value::Object(marker))
            }
            PatternValue::Literal(value) => Some(value.clone()),
        }
    }
}

fn is_literal_marker(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.len() == 1 && map.contains_key(LITERAL_MARKER))
}

/// Ordered list of `(path, expected)` entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pattern {
    entries: Vec<(FieldPath, PatternValue)>,
}

impl Pattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry. Objects in `value` match partially.
    pub fn field(mut self, path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        self.entries
            .push((path.into(), PatternValue::from_value(value.into())));
        self
    }

    /// Adds an entry that must match the document's subtree exactly
    pub fn literal(mut self, path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        self.entries
            .push((path.into(), PatternValue::Literal(value.into())));
        self
    }

    /// Adds a nested partial pattern
    pub fn nested(mut self, path: impl Into<FieldPath>, pattern: Pattern) -> Self {
        self.entries
            .push((path.into(), PatternValue::Partial(pattern)));
        self
    }

    /// Builds a pattern from a JSON object. Keys are taken as single field
    /// names, not dotted paths.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self {
            entries: map
                .into_iter()
                .map(|(key, value)| (FieldPath::key(key), PatternValue::from_value(value)))
                .collect(),
        }
    }

    /// Builds a pattern from a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self, PredicateParseError> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(PredicateParseError::PatternNotObject(type_name(&other))),
        }
    }

    /// JSON form. A multi-step path is written as nested single-key objects,
    /// so `a.b = 1` becomes `{"a": {"b": 1}}`.
    ///
    /// Returns `None` when the JSON form would read back as a different
    /// pattern: a root or index step, two entries under one top-level key, or
    /// a nesting that spells the literal marker.
    pub fn to_value(&self) -> Option<Value> {
        let mut map = Map::new();
        for (path, expected) in &self.entries {
            let (first, rest) = path.steps().split_first()?;
            let PathStep::Key(key) = first else {
                return None;
            };

            let mut value = expected.to_value()?;
            for step in rest.iter().rev() {
                let PathStep::Key(inner_key) = step else {
                    return None;
                };
                let mut nested = Map::new();
                nested.insert(inner_key.clone(), value);
                value = Value::Object(nested);
                if is_literal_marker(&value) {
                    return None;
                }
            }

            if map.insert(key.clone(), value).is_some() {
                return None;
            }
        }
        Some(Value::Object(map))
    }

    pub fn entries(&self) -> &[(FieldPath, PatternValue)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Nesting depth. A flat pattern has depth 1.
    pub fn depth(&self) -> usize {
        self.depth_capped(usize::MAX)
    }

    /// Nesting depth, counted no further than `limit + 1`
    pub fn depth_capped(&self, limit: usize) -> usize {
        if limit == 0 {
            return 1;
        }
        1 + self
            .entries
            .iter()
            .filter_map(|(_, expected)| match expected {
                PatternValue::Partial(inner) => Some(inner.depth_capped(limit - 1)),
                PatternValue::Literal(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Matches the pattern against `document`.
    ///
    /// Entries are checked in order. The first mismatch returns `false`; the
    /// first missing path raises a fault naming the full path.
    pub fn evaluate(&self, document: &Value) -> EvalResult<bool> {
        self.matches_at(document, &FieldPath::root())
    }

    fn matches_at(&self, document: &Value, base: &FieldPath) -> EvalResult<bool> {
        for (path, expected) in &self.entries {
            let full = base.join(path);

            let actual = match access(document, &full) {
                AccessResult::Found(value) => value,
                AccessResult::Missing => return Err(MissingFieldFault::at(full).into()),
            };

            let matched = match expected {
                PatternValue::Literal(value) => values_equal(actual, value),
                PatternValue::Partial(inner) => inner.matches_at(document, &full)?,
            };

            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
