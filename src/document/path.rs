//! Field paths used to descend into documents
//!
//! Textual form is dot-separated: `"address.city"`, `"tags.0"`. A segment made
//! only of ASCII digits is an array index. The JSON array form
//! (`["address", "city"]`, `["tags", 0]`) is accepted wherever a path is
//! deserialized, and is the only way to name a key that contains a dot or is
//! purely numeric.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single step in a field path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Object key lookup
    Key(String),
    /// Array index lookup
    Index(usize),
}

impl PathStep {
    fn parse_segment(segment: &str) -> Self {
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = segment.parse::<usize>() {
                return PathStep::Index(index);
            }
        }
        PathStep::Key(segment.to_string())
    }

    /// Returns true if the textual form of this step round-trips through `parse`
    fn is_plain(&self) -> bool {
        match self {
            PathStep::Index(_) => true,
            PathStep::Key(key) => {
                !key.is_empty()
                    && !key.contains('.')
                    && matches!(Self::parse_segment(key), PathStep::Key(_))
            }
        }
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key(key) => write!(f, "{}", key),
            PathStep::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Ordered sequence of steps from the document root.
///
/// The empty path denotes the whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PathRepr", into = "PathRepr")]
pub struct FieldPath {
    steps: Vec<PathStep>,
}

impl FieldPath {
    /// The empty path (whole document)
    pub fn root() -> Self {
        Self { steps: Vec::new() }
    }

    /// A single key step. The key is taken verbatim, dots included.
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            steps: vec![PathStep::Key(key.into())],
        }
    }

    /// Parses the dot-separated textual form. Never fails.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::root();
        }
        Self {
            steps: text.split('.').map(PathStep::parse_segment).collect(),
        }
    }

    /// Builds a path from explicit steps
    pub fn from_steps(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns a new path with `other` appended to this one
    pub fn join(&self, other: &FieldPath) -> FieldPath {
        let mut steps = Vec::with_capacity(self.steps.len() + other.steps.len());
        steps.extend_from_slice(&self.steps);
        steps.extend_from_slice(&other.steps);
        FieldPath { steps }
    }

    /// Appends a key step
    pub fn push_key(&mut self, key: impl Into<String>) {
        self.steps.push(PathStep::Key(key.into()));
    }

    /// Appends an index step
    pub fn push_index(&mut self, index: usize) {
        self.steps.push(PathStep::Index(index));
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

impl From<&str> for FieldPath {
    fn from(text: &str) -> Self {
        FieldPath::parse(text)
    }
}

impl From<String> for FieldPath {
    fn from(text: String) -> Self {
        FieldPath::parse(&text)
    }
}

impl From<&FieldPath> for FieldPath {
    fn from(path: &FieldPath) -> Self {
        path.clone()
    }
}

impl From<Vec<PathStep>> for FieldPath {
    fn from(steps: Vec<PathStep>) -> Self {
        FieldPath::from_steps(steps)
    }
}

/// Wire representation: dotted text, or an explicit list of steps
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PathRepr {
    Text(String),
    Steps(Vec<StepRepr>),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StepRepr {
    Index(usize),
    Key(String),
}

impl TryFrom<PathRepr> for FieldPath {
    type Error = std::convert::Infallible;

    fn try_from(repr: PathRepr) -> Result<Self, Self::Error> {
        Ok(match repr {
            PathRepr::Text(text) => FieldPath::parse(&text),
            PathRepr::Steps(steps) => FieldPath::from_steps(
                steps
                    .into_iter()
                    .map(|step| match step {
                        StepRepr::Index(index) => PathStep::Index(index),
                        StepRepr::Key(key) => PathStep::Key(key),
                    })
                    .collect(),
            ),
        })
    }
}

impl From<FieldPath> for PathRepr {
    fn from(path: FieldPath) -> Self {
        if path.steps.iter().all(PathStep::is_plain) {
            return PathRepr::Text(path.to_string());
        }
        PathRepr::Steps(
            path.steps
                .into_iter()
                .map(|step| match step {
                    PathStep::Index(index) => StepRepr::Index(index),
                    PathStep::Key(key) => StepRepr::Key(key),
                })
                .collect(),
        )
    }
}
