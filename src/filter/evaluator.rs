//! Filter evaluator
//!
//! Drives predicate evaluation over a sequence and applies the default policy.
//!
//! # Per-document flow
//!
//! 1. Pull the next document from the input
//! 2. Evaluate the predicate
//! 3. `true` emits, `false` skips
//! 4. A missing-field fault is resolved by the default policy
//!    (skip, emit, or abort the operation)
//! 5. A predicate type error aborts the operation regardless of policy
//!
//! Streams are filtered lazily: one input document is pulled per decision and
//! nothing is read ahead. Once the output yields an error it is exhausted, so
//! the input stays "stopped at document N".

use std::iter::FusedIterator;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::predicate::{EvalError, Predicate};

use super::errors::{FilterError, FilterResult};
use super::policy::{DefaultPolicy, FilterOptions, Verdict};
use super::sequence::Sequence;

/// Maximum predicate nesting accepted unless configured otherwise
pub const DEFAULT_MAX_EXPRESSION_DEPTH: usize = 64;

/// Counters for one filter run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    /// Documents pulled from the input and evaluated
    pub scanned: usize,
    /// Documents emitted
    pub emitted: usize,
    /// Documents whose predicate was false
    pub rejected: usize,
    /// Faulting documents dropped by `Skip`
    pub missing_skipped: usize,
    /// Faulting documents emitted by `IncludeOnMissing`
    pub missing_included: usize,
}

impl FilterStats {
    fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Matched => self.emitted += 1,
            Verdict::Rejected => self.rejected += 1,
            Verdict::MissingSkipped => self.missing_skipped += 1,
            Verdict::MissingIncluded => {
                self.missing_included += 1;
                self.emitted += 1;
            }
        }
    }
}

/// Result of filtering a materialized array
#[derive(Debug, Clone)]
pub struct FilterOutput {
    /// Documents in input order
    pub documents: Vec<Value>,
    pub stats: FilterStats,
}

/// A predicate bound to its options. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Filter {
    predicate: Arc<Predicate>,
    options: FilterOptions,
}

impl Filter {
    /// Creates a filter, rejecting predicates deeper than
    /// `DEFAULT_MAX_EXPRESSION_DEPTH`
    pub fn new(predicate: impl Into<Predicate>, options: FilterOptions) -> FilterResult<Self> {
        Self::with_max_depth(predicate, options, DEFAULT_MAX_EXPRESSION_DEPTH)
    }

    /// Creates a filter with an explicit depth limit
    pub fn with_max_depth(
        predicate: impl Into<Predicate>,
        options: FilterOptions,
        max_depth: usize,
    ) -> FilterResult<Self> {
        let predicate = predicate.into();
        if predicate.depth_capped(max_depth) > max_depth {
            return Err(FilterError::InvalidPredicate(format!(
                "{} predicate depth exceeds maximum of {}",
                predicate.kind(),
                max_depth
            )));
        }

        Ok(Self {
            predicate: Arc::new(predicate),
            options,
        })
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn options(&self) -> FilterOptions {
        self.options
    }

    pub fn policy(&self) -> DefaultPolicy {
        self.options.default
    }

    /// Decides the fate of one document. `position` is only used for errors.
    pub fn judge(&self, document: &Value, position: usize) -> FilterResult<Verdict> {
        match self.predicate.evaluate(document) {
            Ok(true) => Ok(Verdict::Matched),
            Ok(false) => Ok(Verdict::Rejected),
            Err(EvalError::Missing(fault)) => self.options.default.resolve(fault, position),
            Err(EvalError::Type(error)) => Err(FilterError::PredicateType { error, position }),
        }
    }

    /// Filters any stream of documents lazily
    pub fn stream<I>(&self, input: I) -> FilterStream<I::IntoIter>
    where
        I: IntoIterator<Item = FilterResult<Value>>,
    {
        FilterStream {
            filter: self.clone(),
            input: input.into_iter(),
            position: 0,
            stats: FilterStats::default(),
            halted: false,
        }
    }

    /// Filters a materialized array, returning the matches and counters
    pub fn filter_array(&self, documents: Vec<Value>) -> FilterResult<FilterOutput> {
        let mut stream = self.stream(documents.into_iter().map(Ok::<Value, FilterError>));
        let mut matched = Vec::new();

        for item in stream.by_ref() {
            matched.push(item?);
        }

        Ok(FilterOutput {
            documents: matched,
            stats: stream.stats(),
        })
    }

    /// Filters a sequence, keeping its kind. A selection becomes a stream.
    ///
    /// Arrays are evaluated eagerly, so a `RaiseOnMissing` abort is returned
    /// here. Streams report errors as items when pulled.
    pub fn apply<'a>(&self, input: Sequence<'a>) -> FilterResult<Sequence<'a>> {
        match input {
            Sequence::Array(documents) => {
                let output = self.filter_array(documents)?;
                debug!(
                    scanned = output.stats.scanned,
                    emitted = output.stats.emitted,
                    "array filtered"
                );
                Ok(Sequence::Array(output.documents))
            }
            Sequence::Stream(stream) => Ok(Sequence::Stream(Box::new(self.stream(stream)))),
            Sequence::Selection(selection) => {
                debug!(
                    table = selection.table_name(),
                    len = selection.len(),
                    "filtering selection into stream"
                );
                Ok(Sequence::Stream(Box::new(
                    self.stream(selection.into_stream()),
                )))
            }
        }
    }
}

/// Lazy filtered view of an input stream
pub struct FilterStream<I> {
    filter: Filter,
    input: I,
    position: usize,
    stats: FilterStats,
    halted: bool,
}

impl<I> FilterStream<I> {
    /// Counters so far
    pub fn stats(&self) -> FilterStats {
        self.stats
    }

    /// Number of input items pulled so far
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns true once an error has been yielded or the input ran out
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    fn halt(&mut self, error: FilterError) -> FilterResult<Value> {
        self.halted = true;
        warn!(
            code = error.code(),
            pulled = self.position,
            error = %error,
            "filter aborted"
        );
        Err(error)
    }
}

impl<I> Iterator for FilterStream<I>
where
    I: Iterator<Item = FilterResult<Value>>,
{
    type Item = FilterResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted {
            return None;
        }

        loop {
            let Some(item) = self.input.next() else {
                self.halted = true;
                return None;
            };
            let position = self.position;
            self.position += 1;

            let document = match item {
                Ok(document) => document,
                Err(error) => return Some(self.halt(error)),
            };

            self.stats.scanned += 1;
            match self.filter.judge(&document, position) {
                Ok(verdict) => {
                    trace!(position, ?verdict, "document judged");
                    self.stats.record(verdict);
                    if verdict.emits() {
                        return Some(Ok(document));
                    }
                }
                Err(error) => return Some(self.halt(error)),
            }
        }
    }
}

impl<I> FusedIterator for FilterStream<I> where I: Iterator<Item = FilterResult<Value>> {}

/// Filters `input` with `predicate` under `options`
pub fn filter_sequence<'a>(
    input: Sequence<'a>,
    predicate: impl Into<Predicate>,
    options: FilterOptions,
) -> FilterResult<Sequence<'a>> {
    Filter::new(predicate, options)?.apply(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::sequence::{MemoryTable, Selection, SequenceKind};
    use crate::predicate::{Expr, MissingFieldFault, Pattern};
    use serde_json::json;
    use std::cell::Cell;

    fn options(policy: DefaultPolicy) -> FilterOptions {
        FilterOptions::with_default(policy)
    }

    fn age_30() -> Pattern {
        Pattern::new().field("age", 30)
    }

    #[test]
    fn test_skip_excludes_missing() {
        let filter = Filter::new(age_30(), options(DefaultPolicy::Skip)).unwrap();
        let output = filter
            .filter_array(vec![json!({"age": 30}), json!({"name": "x"})])
            .unwrap();
        assert_eq!(output.documents, vec![json!({"age": 30})]);
        assert_eq!(output.stats.missing_skipped, 1);
    }

    #[test]
    fn test_include_emits_missing() {
        let filter = Filter::new(age_30(), options(DefaultPolicy::IncludeOnMissing)).unwrap();
        let output = filter
            .filter_array(vec![json!({"age": 30}), json!({"name": "x"}), json!({"age": 1})])
            .unwrap();
        assert_eq!(
            output.documents,
            vec![json!({"age": 30}), json!({"name": "x"})]
        );
        assert_eq!(
            output.stats,
            FilterStats {
                scanned: 3,
                emitted: 2,
                rejected: 1,
                missing_skipped: 0,
                missing_included: 1,
            }
        );
    }

    #[test]
    fn test_raise_aborts_array() {
        let filter = Filter::new(age_30(), options(DefaultPolicy::RaiseOnMissing)).unwrap();
        let err = filter
            .filter_array(vec![json!({"name": "x"}), json!({"age": 30})])
            .unwrap_err();
        assert_eq!(
            err,
            FilterError::FieldAccess {
                fault: MissingFieldFault::at("age"),
                position: 0,
            }
        );
    }

    #[test]
    fn test_type_error_ignores_policy() {
        let predicate = Expr::field("age").gt(json!(18));
        for policy in [
            DefaultPolicy::Skip,
            DefaultPolicy::IncludeOnMissing,
            DefaultPolicy::RaiseOnMissing,
        ] {
            let filter = Filter::new(predicate.clone(), options(policy)).unwrap();
            let err = filter
                .filter_array(vec![json!({"age": "old"})])
                .unwrap_err();
            assert_eq!(err.code(), "FILTER_PREDICATE_TYPE");
        }
    }

    #[test]
    fn test_stream_is_lazy() {
        let pulled = Cell::new(0);
        let input = (0..1_000_000u64).map(|n| {
            pulled.set(pulled.get() + 1);
            Ok(json!({"n": n}))
        });

        let filter = Filter::new(
            Expr::field("n").ge(json!(10)),
            FilterOptions::default(),
        )
        .unwrap();
        let first: Vec<Value> = filter
            .stream(input)
            .take(2)
            .collect::<FilterResult<_>>()
            .unwrap();

        assert_eq!(first, vec![json!({"n": 10}), json!({"n": 11})]);
        assert_eq!(pulled.get(), 12);
    }

    #[test]
    fn test_stream_halts_after_error() {
        let filter = Filter::new(age_30(), options(DefaultPolicy::RaiseOnMissing)).unwrap();
        let input = vec![json!({"age": 30}), json!({}), json!({"age": 30})];
        let mut stream = filter.stream(input.into_iter().map(Ok));

        assert_eq!(stream.next(), Some(Ok(json!({"age": 30}))));
        assert!(matches!(stream.next(), Some(Err(FilterError::FieldAccess { position: 1, .. }))));
        assert!(stream.is_halted());
        assert_eq!(stream.next(), None);
        assert_eq!(stream.position(), 2);
    }

    #[test]
    fn test_source_error_passes_through() {
        let filter = Filter::new(age_30(), FilterOptions::default()).unwrap();
        let input = vec![Ok(json!({"age": 30})), Err(FilterError::source(1, "truncated"))];
        let results: Vec<_> = filter.stream(input).collect();
        assert_eq!(results[1], Err(FilterError::source(1, "truncated")));
    }

    #[test]
    fn test_apply_keeps_kind() {
        let filter = Filter::new(age_30(), FilterOptions::default()).unwrap();

        let array = filter.apply(Sequence::Array(vec![json!({"age": 30})])).unwrap();
        assert_eq!(array.kind(), SequenceKind::Array);

        let stream = filter
            .apply(Sequence::stream(vec![Ok(json!({"age": 30}))]))
            .unwrap();
        assert_eq!(stream.kind(), SequenceKind::Stream);
    }

    #[test]
    fn test_selection_becomes_stream() {
        let table = MemoryTable::new("people", vec![json!({"age": 30}), json!({"age": 40})]);
        let output = filter_sequence(
            Selection::all(&table).into(),
            age_30(),
            FilterOptions::default(),
        )
        .unwrap();
        assert_eq!(output.kind(), SequenceKind::Stream);
        assert_eq!(output.collect_documents().unwrap(), vec![json!({"age": 30})]);
    }

    #[test]
    fn test_depth_limit() {
        let mut expr = Expr::lit(true);
        for _ in 0..10 {
            expr = !expr;
        }
        let err = Filter::with_max_depth(expr.clone(), FilterOptions::default(), 5).unwrap_err();
        assert_eq!(err.code(), "FILTER_INVALID_PREDICATE");
        assert!(Filter::with_max_depth(expr, FilterOptions::default(), 11).is_ok());
    }

    #[test]
    fn test_depth_limit_applies_to_nested_patterns() {
        let mut pattern = Pattern::new().field("leaf", 1);
        for level in 0..6 {
            pattern = Pattern::new().nested(format!("level{}", level), pattern);
        }
        assert_eq!(pattern.depth(), 7);

        let err =
            Filter::with_max_depth(pattern.clone(), FilterOptions::default(), 6).unwrap_err();
        assert_eq!(err.code(), "FILTER_INVALID_PREDICATE");
        assert!(Filter::with_max_depth(pattern, FilterOptions::default(), 7).is_ok());
    }

    /// Yields `None` once, then keeps producing documents.
    struct Resumable {
        calls: usize,
    }

    impl Iterator for Resumable {
        type Item = FilterResult<Value>;

        fn next(&mut self) -> Option<Self::Item> {
            self.calls += 1;
            match self.calls {
                1 => None,
                _ => Some(Ok(json!({"age": 30}))),
            }
        }
    }

    #[test]
    fn test_stream_stays_ended_after_input_ends() {
        let filter = Filter::new(age_30(), FilterOptions::default()).unwrap();
        let mut stream = filter.stream(Resumable { calls: 0 }).fuse();

        assert_eq!(stream.next(), None);
        assert_eq!(stream.next(), None);
    }

    #[test]
    fn test_end_of_input_halts_stream() {
        let filter = Filter::new(age_30(), FilterOptions::default()).unwrap();
        let mut stream = filter.stream(Resumable { calls: 0 });

        assert_eq!(stream.next(), None);
        assert!(stream.is_halted());
        assert_eq!(stream.next(), None);
        assert_eq!(stream.position(), 0);
    }
}
