//! Document model for docfilter
//!
//! Documents are `serde_json::Value` trees with ordered objects. A stored
//! document never contains an "absent" marker: absence only exists as an
//! accessor outcome (`AccessResult::Missing`).

mod access;
mod compare;
mod path;

pub use access::{access, AccessResult};
pub use compare::{compare_values, type_name, values_equal};
pub use path::{FieldPath, PathStep};

/// A document is a JSON value
pub type Document = serde_json::Value;
