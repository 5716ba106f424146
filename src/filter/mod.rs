//! Filter subsystem for docfilter
//!
//! Applies a predicate to every document of a sequence and resolves
//! missing-field faults through a default policy.
//!
//! # Guarantees
//!
//! - Output is a subsequence of the input in the same order
//! - Streams are filtered lazily, with no read-ahead
//! - Output kind equals input kind, except Selection becomes Stream
//! - `RaiseOnMissing` and predicate type errors terminate the operation

mod errors;
mod evaluator;
mod policy;
mod sequence;

pub use errors::{FilterError, FilterResult};
pub use evaluator::{
    filter_sequence, Filter, FilterOutput, FilterStats, FilterStream,
    DEFAULT_MAX_EXPRESSION_DEPTH,
};
pub use policy::{DefaultPolicy, FilterOptions, Verdict};
pub use sequence::{DocumentStream, MemoryTable, Selection, Sequence, SequenceKind, Table};
