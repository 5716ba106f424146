//! docfilter - predicate evaluation and missing-field default policies
//!
//! Filters sequences of JSON documents with a pattern, an expression tree or a
//! function, telling "did not match" apart from "field was missing" and
//! resolving the latter with a per-call default policy.
//!
//! ```
//! use docfilter::filter::{filter_sequence, DefaultPolicy, FilterOptions, Sequence};
//! use docfilter::predicate::Pattern;
//! use serde_json::json;
//!
//! let docs = vec![json!({"age": 30}), json!({"name": "x"})];
//! let options = FilterOptions::with_default(DefaultPolicy::IncludeOnMissing);
//! let out = filter_sequence(Sequence::Array(docs), Pattern::new().field("age", 30), options)
//!     .unwrap()
//!     .collect_documents()
//!     .unwrap();
//! assert_eq!(out, vec![json!({"age": 30}), json!({"name": "x"})]);
//! ```

pub mod cli;
pub mod document;
pub mod filter;
pub mod predicate;

pub use document::{access, AccessResult, Document, FieldPath, PathStep};
pub use filter::{filter_sequence, DefaultPolicy, Filter, FilterError, FilterOptions, Sequence};
pub use predicate::{Expr, MissingFieldFault, Pattern, Predicate};
