//! JSON wire form of predicates
//!
//! ```json
//! {"pattern": {"age": 30, "address": {"city": "Oslo"}}}
//! {"expr": {"compare": {"op": "ge", "lhs": {"field": "age"}, "rhs": {"literal": 18}}}}
//! ```
//!
//! Function predicates have no wire form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::PredicateParseError;
use super::expr::Expr;
use super::pattern::Pattern;
use super::Predicate;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
enum PredicateRepr {
    Pattern(Map<String, Value>),
    Expr(Expr),
}

impl Predicate {
    /// Parses the JSON wire form from text
    pub fn from_json_str(text: &str) -> Result<Predicate, PredicateParseError> {
        let repr: PredicateRepr = serde_json::from_str(text)?;
        Ok(repr.into())
    }

    /// Parses the JSON wire form from a value
    pub fn from_json(value: Value) -> Result<Predicate, PredicateParseError> {
        let repr: PredicateRepr = serde_json::from_value(value)?;
        Ok(repr.into())
    }

    /// Returns the JSON wire form. `None` for function predicates and for
    /// patterns whose paths cannot be spelled as nested objects.
    pub fn to_json(&self) -> Option<Value> {
        let repr = match self {
            Predicate::Pattern(pattern) => match pattern.to_value()? {
                Value::Object(map) => PredicateRepr::Pattern(map),
                _ => return None,
            },
            Predicate::Expression(expr) => PredicateRepr::Expr(expr.clone()),
            Predicate::Function(_) => return None,
        };
        serde_json::to_value(repr).ok()
    }
}

impl From<PredicateRepr> for Predicate {
    fn from(repr: PredicateRepr) -> Self {
        match repr {
            PredicateRepr::Pattern(map) => Predicate::Pattern(Pattern::from_map(map)),
            PredicateRepr::Expr(expr) => Predicate::Expression(expr),
        }
    }
}
