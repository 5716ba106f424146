//! Document sequences
//!
//! A filter's input and output are `Sequence`s of one of three kinds:
//!
//! - `Array`: finite and materialized
//! - `Stream`: lazy, possibly unbounded, pulled one document at a time
//! - `Selection`: index-addressable range of a table
//!
//! Filtering keeps the kind, except that a filtered `Selection` is a `Stream`:
//! the result is no longer a contiguous index range.

use std::fmt;
use std::ops::Range;

use serde::Serialize;
use serde_json::Value;

use super::errors::{FilterError, FilterResult};

/// Lazy source of documents. Errors terminate the sequence.
pub type DocumentStream<'a> = Box<dyn Iterator<Item = FilterResult<Value>> + 'a>;

/// Structural category of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceKind {
    Array,
    Stream,
    Selection,
}

impl SequenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceKind::Array => "array",
            SequenceKind::Stream => "stream",
            SequenceKind::Selection => "selection",
        }
    }

    /// Kind of the sequence produced by filtering a sequence of this kind
    pub fn filtered(&self) -> SequenceKind {
        match self {
            SequenceKind::Array => SequenceKind::Array,
            SequenceKind::Stream | SequenceKind::Selection => SequenceKind::Stream,
        }
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for reading documents from a table by position.
///
/// Implemented by whatever storage supplies the documents; the filter core
/// only reads.
pub trait Table {
    /// Table name for logs
    fn name(&self) -> &str;

    /// Number of addressable positions
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the document at `position`.
    /// Returns None if the position holds no document.
    fn read_at(&self, position: usize) -> FilterResult<Option<Value>>;
}

/// In-memory table
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    name: String,
    documents: Vec<Value>,
}

impl MemoryTable {
    pub fn new(name: impl Into<String>, documents: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            documents,
        }
    }

    pub fn insert(&mut self, document: Value) -> usize {
        self.documents.push(document);
        self.documents.len() - 1
    }
}

impl Table for MemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.documents.len()
    }

    fn read_at(&self, position: usize) -> FilterResult<Option<Value>> {
        Ok(self.documents.get(position).cloned())
    }
}

/// Contiguous, index-addressable range of a table
#[derive(Clone)]
pub struct Selection<'a> {
    table: &'a dyn Table,
    range: Range<usize>,
}

impl<'a> Selection<'a> {
    /// Selects the whole table
    pub fn all(table: &'a dyn Table) -> Self {
        Self {
            range: 0..table.len(),
            table,
        }
    }

    /// Selects `range`, clamped to the table bounds
    pub fn between(table: &'a dyn Table, range: Range<usize>) -> Self {
        let end = range.end.min(table.len());
        let start = range.start.min(end);
        Self {
            table,
            range: start..end,
        }
    }

    pub fn table_name(&self) -> &str {
        self.table.name()
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Reads the document at `index`, relative to the start of the selection
    pub fn get(&self, index: usize) -> FilterResult<Option<Value>> {
        if index >= self.len() {
            return Ok(None);
        }
        self.table.read_at(self.range.start + index)
    }

    /// Narrows the selection; `range` is relative to this selection
    pub fn slice(&self, range: Range<usize>) -> Selection<'a> {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        Selection {
            table: self.table,
            range: self.range.start + start..self.range.start + end,
        }
    }

    /// Streams the selected documents in index order, skipping empty positions
    pub fn into_stream(self) -> DocumentStream<'a> {
        let table = self.table;
        Box::new(
            self.range
                .filter_map(move |position| table.read_at(position).transpose()),
        )
    }
}

impl fmt::Debug for Selection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("table", &self.table.name())
            .field("range", &self.range)
            .finish()
    }
}

/// A sequence of documents
pub enum Sequence<'a> {
    Array(Vec<Value>),
    Stream(DocumentStream<'a>),
    Selection(Selection<'a>),
}

impl<'a> Sequence<'a> {
    /// Wraps any iterator of documents as a lazy stream
    pub fn stream<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = FilterResult<Value>>,
        I::IntoIter: 'a,
    {
        Sequence::Stream(Box::new(documents.into_iter()))
    }

    pub fn kind(&self) -> SequenceKind {
        match self {
            Sequence::Array(_) => SequenceKind::Array,
            Sequence::Stream(_) => SequenceKind::Stream,
            Sequence::Selection(_) => SequenceKind::Selection,
        }
    }

    /// Turns the sequence into a stream, whatever its kind
    pub fn into_stream(self) -> DocumentStream<'a> {
        match self {
            Sequence::Array(documents) => {
                Box::new(documents.into_iter().map(Ok::<Value, FilterError>))
            }
            Sequence::Stream(stream) => stream,
            Sequence::Selection(selection) => selection.into_stream(),
        }
    }

    /// Drains the sequence into a vector, stopping at the first error
    pub fn collect_documents(self) -> FilterResult<Vec<Value>> {
        match self {
            Sequence::Array(documents) => Ok(documents),
            other => other.into_stream().collect(),
        }
    }
}

impl From<Vec<Value>> for Sequence<'_> {
    fn from(documents: Vec<Value>) -> Self {
        Sequence::Array(documents)
    }
}

impl<'a> From<Selection<'a>> for Sequence<'a> {
    fn from(selection: Selection<'a>) -> Self {
        Sequence::Selection(selection)
    }
}

impl fmt::Debug for Sequence<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sequence::Array(documents) => f.debug_tuple("Array").field(documents).finish(),
            Sequence::Stream(_) => f.write_str("Stream(..)"),
            Sequence::Selection(selection) => f.debug_tuple("Selection").field(selection).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> MemoryTable {
        MemoryTable::new(
            "users",
            vec![json!({"n": 0}), json!({"n": 1}), json!({"n": 2}), json!({"n": 3})],
        )
    }

    #[test]
    fn test_selection_is_index_addressable() {
        let table = table();
        let selection = Selection::between(&table, 1..3);
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.get(0).unwrap(), Some(json!({"n": 1})));
        assert_eq!(selection.get(2).unwrap(), None);
    }

    #[test]
    fn test_selection_clamps_and_slices() {
        let table = table();
        let selection = Selection::between(&table, 2..100);
        assert_eq!(selection.len(), 2);

        let narrowed = Selection::all(&table).slice(1..2);
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed.get(0).unwrap(), Some(json!({"n": 1})));
    }

    #[test]
    fn test_selection_stream_in_order() {
        let table = table();
        let docs = Sequence::from(Selection::between(&table, 1..4))
            .collect_documents()
            .unwrap();
        assert_eq!(docs, vec![json!({"n": 1}), json!({"n": 2}), json!({"n": 3})]);
    }

    #[test]
    fn test_kinds() {
        let table = table();
        assert_eq!(Sequence::Array(vec![]).kind(), SequenceKind::Array);
        assert_eq!(Sequence::stream(Vec::new()).kind(), SequenceKind::Stream);
        assert_eq!(
            Sequence::from(Selection::all(&table)).kind(),
            SequenceKind::Selection
        );
    }

    #[test]
    fn test_filtered_kind() {
        assert_eq!(SequenceKind::Array.filtered(), SequenceKind::Array);
        assert_eq!(SequenceKind::Stream.filtered(), SequenceKind::Stream);
        assert_eq!(SequenceKind::Selection.filtered(), SequenceKind::Stream);
    }

    #[test]
    fn test_stream_collect_stops_at_error() {
        let items = vec![
            Ok(json!(1)),
            Err(FilterError::source(1, "broken")),
            Ok(json!(2)),
        ];
        let err = Sequence::stream(items).collect_documents().unwrap_err();
        assert_eq!(err, FilterError::source(1, "broken"));
    }
}
