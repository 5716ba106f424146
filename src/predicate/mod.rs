//! Predicates over documents
//!
//! Three variants share one evaluation contract,
//! `evaluate(document) -> Result<bool, EvalError>`:
//!
//! - `Pattern`: partial-document equality
//! - `Expression`: boolean/comparison tree with explicit `DefaultOf` escapes
//! - `Function`: opaque closure reading fields through a `FieldContext`
//!
//! A missing field is never reported as `false`. It is raised as a
//! `MissingFieldFault` so the filter's default policy can tell "did not
//! match" apart from "could not be evaluated".

mod errors;
mod expr;
mod function;
mod parse;
mod pattern;

pub use errors::{EvalError, EvalResult, MissingFieldFault, PredicateParseError, PredicateTypeError};
pub use expr::{CompareOp, Expr};
pub use function::{FieldContext, FnPredicate, PredicateFn};
pub use pattern::{Pattern, PatternValue, LITERAL_MARKER};

use serde_json::Value;

/// A boolean test over a document
#[derive(Debug, Clone)]
pub enum Predicate {
    Pattern(Pattern),
    Expression(Expr),
    Function(FnPredicate),
}

impl Predicate {
    /// Creates a function predicate
    pub fn function<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&FieldContext<'_>) -> EvalResult<bool> + Send + Sync + 'static,
    {
        Predicate::Function(FnPredicate::new(name, func))
    }

    /// Evaluates the predicate against one document
    pub fn evaluate(&self, document: &Value) -> EvalResult<bool> {
        match self {
            Predicate::Pattern(pattern) => pattern.evaluate(document),
            Predicate::Expression(expr) => expr.evaluate(document),
            Predicate::Function(func) => func.evaluate(document),
        }
    }

    /// Nesting depth; function predicates count as a single node
    pub fn depth(&self) -> usize {
        self.depth_capped(usize::MAX)
    }

    /// Nesting depth, counted no further than `limit + 1`
    pub fn depth_capped(&self, limit: usize) -> usize {
        match self {
            Predicate::Pattern(pattern) => pattern.depth_capped(limit),
            Predicate::Expression(expr) => expr.depth_capped(limit),
            Predicate::Function(_) => 1,
        }
    }

    /// Returns the variant name for logs and explain output
    pub fn kind(&self) -> &'static str {
        match self {
            Predicate::Pattern(_) => "pattern",
            Predicate::Expression(_) => "expression",
            Predicate::Function(_) => "function",
        }
    }
}

impl From<Pattern> for Predicate {
    fn from(pattern: Pattern) -> Self {
        Predicate::Pattern(pattern)
    }
}

impl From<Expr> for Predicate {
    fn from(expr: Expr) -> Self {
        Predicate::Expression(expr)
    }
}

impl From<FnPredicate> for Predicate {
    fn from(func: FnPredicate) -> Self {
        Predicate::Function(func)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_variants_agree_on_missing_field() {
        let doc = json!({"name": "x"});
        let fault = EvalError::Missing(MissingFieldFault::at("age"));

        let pattern: Predicate = Pattern::new().field("age", 30).into();
        let expr: Predicate = Expr::field("age").eq(json!(30)).into();
        let func = Predicate::function("age_is_30", |ctx| Ok(ctx.field("age")? == &json!(30)));

        for predicate in [pattern, expr, func] {
            assert_eq!(predicate.evaluate(&doc), Err(fault.clone()), "{}", predicate.kind());
        }
    }

    #[test]
    fn test_depth_by_variant() {
        assert_eq!(Predicate::from(Pattern::new().field("a", 1)).depth(), 1);
        assert_eq!(Predicate::from(!Expr::field("a")).depth(), 2);
        assert_eq!(Predicate::function("f", |_| Ok(true)).depth(), 1);
    }

    #[test]
    fn test_depth_capped_on_very_deep_tree() {
        let mut expr = Expr::lit(true);
        for _ in 0..200_000 {
            expr = !expr;
        }
        let predicate = Predicate::from(expr);
        assert_eq!(predicate.depth_capped(64), 65);
        // Dropping a boxed chain this long recurses once per level.
        std::mem::forget(predicate);
    }

    #[test]
    fn test_predicate_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Predicate>();
    }
}
