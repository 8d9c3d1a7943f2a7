//! Materialized collections and node snapshots, shaped as the JSON the
//! front end consumes.

use serde::Serialize;

use super::{Scalar, Timestamp};

/// The value columns of one live row, in column order.
pub type Tuple = Vec<Scalar>;

/// A collection materialized at some point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collection {
    pub name: String,
    pub tuples: Vec<Tuple>,
}

impl Collection {
    /// A collection with no live rows.
    #[must_use]
    pub const fn empty(name: String) -> Self {
        Self {
            name,
            tuples: Vec::new(),
        }
    }
}

/// Everything known about a node at its latest time.
///
/// `time` is `None` when the node has no rows at all, in which case every
/// collection is listed with empty tuples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub name: String,
    pub rules: Vec<String>,
    pub time: Option<Timestamp>,
    pub collections: Vec<Collection>,
}
