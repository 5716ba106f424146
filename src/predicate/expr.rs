//! Boolean expression trees over field references and literals
//!
//! Evaluation is strictly left to right. A missing field raises a
//! `MissingFieldFault` from the `Field` node that hit it and the fault travels
//! up until a `DefaultOf` absorbs it or it leaves the tree. Faults are not
//! treated like `false` for short-circuiting: a fault in the left operand of
//! `And`/`Or`/`Compare` aborts before the right operand is looked at.

use std::borrow::Cow;
use std::fmt;
use std::ops;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::document::{access, compare_values, type_name, values_equal, AccessResult, FieldPath};

use super::errors::{EvalResult, MissingFieldFault, PredicateTypeError};

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// Returns the operator symbol for messages and explain output
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    /// Applies the operator. Equality is defined for every pair of values;
    /// ordering only between values of the same type.
    pub fn apply(&self, lhs: &Value, rhs: &Value) -> Result<bool, PredicateTypeError> {
        use std::cmp::Ordering::*;

        let ordering = || {
            compare_values(lhs, rhs).ok_or_else(|| PredicateTypeError::Incomparable {
                op: *self,
                lhs: type_name(lhs),
                rhs: type_name(rhs),
            })
        };

        Ok(match self {
            CompareOp::Eq => values_equal(lhs, rhs),
            CompareOp::Ne => !values_equal(lhs, rhs),
            CompareOp::Lt => ordering()? == Less,
            CompareOp::Le => ordering()? != Greater,
            CompareOp::Gt => ordering()? == Greater,
            CompareOp::Ge => ordering()? != Less,
        })
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Expression tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// Constant value
    Literal(Value),
    /// Field reference. Raises a fault when the path is missing.
    Field(FieldPath),
    /// Existence test. Never raises.
    HasField(FieldPath),
    /// Binary comparison
    Compare {
        op: CompareOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    /// Replaces a missing-field fault from `inner` with `fallback`
    DefaultOf { inner: Box<Expr>, fallback: Value },
}

impl Expr {
    pub fn field(path: impl Into<FieldPath>) -> Self {
        Expr::Field(path.into())
    }

    pub fn lit(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn has_field(path: impl Into<FieldPath>) -> Self {
        Expr::HasField(path.into())
    }

    pub fn compare(self, op: CompareOp, rhs: impl Into<Expr>) -> Self {
        Expr::Compare {
            op,
            lhs: Box::new(self),
            rhs: Box::new(rhs.into()),
        }
    }

    pub fn eq(self, rhs: impl Into<Expr>) -> Self {
        self.compare(CompareOp::Eq, rhs)
    }

    pub fn ne(self, rhs: impl Into<Expr>) -> Self {
        self.compare(CompareOp::Ne, rhs)
    }

    pub fn lt(self, rhs: impl Into<Expr>) -> Self {
        self.compare(CompareOp::Lt, rhs)
    }

    pub fn le(self, rhs: impl Into<Expr>) -> Self {
        self.compare(CompareOp::Le, rhs)
    }

    pub fn gt(self, rhs: impl Into<Expr>) -> Self {
        self.compare(CompareOp::Gt, rhs)
    }

    pub fn ge(self, rhs: impl Into<Expr>) -> Self {
        self.compare(CompareOp::Ge, rhs)
    }

    pub fn and(self, rhs: impl Into<Expr>) -> Self {
        Expr::And(Box::new(self), Box::new(rhs.into()))
    }

    pub fn or(self, rhs: impl Into<Expr>) -> Self {
        Expr::Or(Box::new(self), Box::new(rhs.into()))
    }

    /// Wraps this expression so a missing field yields `fallback`
    pub fn default_to(self, fallback: impl Into<Value>) -> Self {
        Expr::DefaultOf {
            inner: Box::new(self),
            fallback: fallback.into(),
        }
    }

    /// Nesting depth of the tree. A leaf has depth 1.
    pub fn depth(&self) -> usize {
        self.depth_capped(usize::MAX)
    }

    /// Nesting depth, counted no further than `limit + 1`. The walk never
    /// descends more than `limit + 1` levels.
    pub fn depth_capped(&self, limit: usize) -> usize {
        if limit == 0 {
            return 1;
        }
        match self {
            Expr::Literal(_) | Expr::Field(_) | Expr::HasField(_) => 1,
            Expr::Not(inner) | Expr::DefaultOf { inner, .. } => 1 + inner.depth_capped(limit - 1),
            Expr::Compare { lhs, rhs, .. } | Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => {
                1 + lhs
                    .depth_capped(limit - 1)
                    .max(rhs.depth_capped(limit - 1))
            }
        }
    }

    /// Evaluates the tree as a predicate: the result must be a boolean.
    pub fn evaluate(&self, document: &Value) -> EvalResult<bool> {
        self.eval_bool(document, "predicate result")
    }

    /// Evaluates the tree to a value.
    pub fn eval<'a>(&'a self, document: &'a Value) -> EvalResult<Cow<'a, Value>> {
        match self {
            Expr::Literal(value) => Ok(Cow::Borrowed(value)),

            Expr::Field(path) => match access(document, path) {
                AccessResult::Found(value) => Ok(Cow::Borrowed(value)),
                AccessResult::Missing => Err(MissingFieldFault::at(path).into()),
            },

            Expr::HasField(path) => Ok(boolean(access(document, path).is_found())),

            Expr::Compare { op, lhs, rhs } => {
                let left = lhs.eval(document)?;
                let right = rhs.eval(document)?;
                Ok(boolean(op.apply(&left, &right)?))
            }

            Expr::And(lhs, rhs) => {
                if !lhs.eval_bool(document, "AND")? {
                    return Ok(boolean(false));
                }
                Ok(boolean(rhs.eval_bool(document, "AND")?))
            }

            Expr::Or(lhs, rhs) => {
                if lhs.eval_bool(document, "OR")? {
                    return Ok(boolean(true));
                }
                Ok(boolean(rhs.eval_bool(document, "OR")?))
            }

            Expr::Not(inner) => Ok(boolean(!inner.eval_bool(document, "NOT")?)),

            Expr::DefaultOf { inner, fallback } => match inner.eval(document) {
                Err(err) if err.is_missing() => {
                    trace!(fault = %err, "default substituted for missing field");
                    Ok(Cow::Borrowed(fallback))
                }
                other => other,
            },
        }
    }

    fn eval_bool(&self, document: &Value, context: &'static str) -> EvalResult<bool> {
        match self.eval(document)?.as_ref() {
            Value::Bool(b) => Ok(*b),
            other => Err(PredicateTypeError::NotBoolean {
                context,
                actual: type_name(other),
            }
            .into()),
        }
    }
}

fn boolean(b: bool) -> Cow<'static, Value> {
    Cow::Owned(Value::Bool(b))
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Literal(value)
    }
}

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::errors::EvalError;
    use serde_json::json;

    fn missing(path: &str) -> EvalError {
        MissingFieldFault::at(path).into()
    }

    #[test]
    fn test_field_compare() {
        let doc = json!({"age": 30});
        assert_eq!(Expr::field("age").ge(json!(18)).evaluate(&doc), Ok(true));
        assert_eq!(Expr::field("age").lt(json!(18)).evaluate(&doc), Ok(false));
    }

    #[test]
    fn test_missing_field_raises() {
        let doc = json!({"name": "x"});
        let expr = Expr::field("role").eq(json!("editor"));
        assert_eq!(expr.evaluate(&doc), Err(missing("role")));
    }

    #[test]
    fn test_null_field_is_found() {
        let doc = json!({"role": null});
        let expr = Expr::field("role").eq(json!("editor"));
        assert_eq!(expr.evaluate(&doc), Ok(false));
    }

    #[test]
    fn test_default_of_absorbs_missing() {
        let doc = json!({"name": "x"});
        let expr = Expr::field("role").eq(json!("editor")).default_to(false);
        assert_eq!(expr.evaluate(&doc), Ok(false));

        let expr = Expr::field("role").eq(json!("editor")).default_to(true);
        assert_eq!(expr.evaluate(&doc), Ok(true));
    }

    #[test]
    fn test_default_of_on_value() {
        let doc = json!({"name": "x"});
        let expr = Expr::field("age").default_to(0).lt(json!(18));
        assert_eq!(expr.evaluate(&doc), Ok(true));
    }

    #[test]
    fn test_default_of_does_not_absorb_type_errors() {
        let doc = json!({"age": "thirty"});
        let expr = Expr::field("age").gt(json!(18)).default_to(false);
        assert!(matches!(expr.evaluate(&doc), Err(EvalError::Type(_))));
    }

    #[test]
    fn test_and_short_circuits_on_false() {
        let doc = json!({"active": false});
        let expr = Expr::field("active").and(Expr::field("missing"));
        assert_eq!(expr.evaluate(&doc), Ok(false));
    }

    #[test]
    fn test_or_short_circuits_on_true() {
        let doc = json!({"active": true});
        let expr = Expr::field("active").or(Expr::field("missing"));
        assert_eq!(expr.evaluate(&doc), Ok(true));
    }

    #[test]
    fn test_or_left_fault_never_reaches_right() {
        let doc = json!({"name": "x"});
        // The right side alone would be true, and a type error if reached.
        for rhs in [Expr::lit(true), Expr::lit(42)] {
            let expr = Expr::field("role").eq(json!("admin")).or(rhs);
            assert_eq!(expr.evaluate(&doc), Err(missing("role")));
        }
    }

    #[test]
    fn test_and_left_fault_propagates() {
        let doc = json!({});
        let expr = Expr::field("a").eq(json!(1)).and(Expr::lit(false));
        assert_eq!(expr.evaluate(&doc), Err(missing("a")));
    }

    #[test]
    fn test_right_fault_propagates_when_needed() {
        let doc = json!({"active": true});
        let expr = Expr::field("active").and(Expr::field("role").eq(json!("editor")));
        assert_eq!(expr.evaluate(&doc), Err(missing("role")));
    }

    #[test]
    fn test_compare_left_fault_skips_right() {
        let doc = json!({});
        let expr = Expr::field("a").eq(Expr::field("b"));
        assert_eq!(expr.evaluate(&doc), Err(missing("a")));
    }

    #[test]
    fn test_not() {
        let doc = json!({"active": false});
        assert_eq!((!Expr::field("active")).evaluate(&doc), Ok(true));
        assert_eq!((!Expr::field("gone")).evaluate(&doc), Err(missing("gone")));
    }

    #[test]
    fn test_has_field_never_raises() {
        let doc = json!({"a": null});
        assert_eq!(Expr::has_field("a").evaluate(&doc), Ok(true));
        assert_eq!(Expr::has_field("b").evaluate(&doc), Ok(false));
    }

    #[test]
    fn test_non_boolean_result_is_type_error() {
        let doc = json!({"age": 30});
        let err = Expr::field("age").evaluate(&doc).unwrap_err();
        assert_eq!(
            err,
            EvalError::Type(PredicateTypeError::NotBoolean {
                context: "predicate result",
                actual: "NUMBER",
            })
        );
    }

    #[test]
    fn test_incomparable_types() {
        let doc = json!({"age": "30"});
        let err = Expr::field("age").gt(json!(18)).evaluate(&doc).unwrap_err();
        assert_eq!(err.to_string(), "cannot compare STRING > NUMBER");
    }

    #[test]
    fn test_depth() {
        assert_eq!(Expr::lit(true).depth(), 1);
        let expr = Expr::field("a").eq(json!(1)).and(!Expr::field("b"));
        assert_eq!(expr.depth(), 3);
    }

    #[test]
    fn test_depth_capped_stops_past_limit() {
        let mut expr = Expr::lit(true);
        for _ in 0..50 {
            expr = !expr;
        }
        assert_eq!(expr.depth(), 51);
        assert_eq!(expr.depth_capped(51), 51);
        assert_eq!(expr.depth_capped(10), 11);
        assert_eq!(expr.depth_capped(0), 1);
    }

    #[test]
    fn test_wire_form() {
        let expr: Expr = serde_json::from_value(json!({
            "or": [
                {"default_of": {
                    "inner": {"compare": {"op": "eq", "lhs": {"field": "role"}, "rhs": {"literal": "editor"}}},
                    "fallback": false
                }},
                {"has_field": "admin"}
            ]
        }))
        .unwrap();

        let expected = Expr::field("role")
            .eq(json!("editor"))
            .default_to(false)
            .or(Expr::has_field("admin"));
        assert_eq!(expr, expected);
    }
}
