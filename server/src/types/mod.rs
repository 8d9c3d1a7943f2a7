//! Value types shared by the store, the query layer and the HTTP handlers.

pub mod collection;
pub mod scalar;
pub mod table_name;

pub use collection::{Collection, NodeSnapshot, Tuple};
pub use scalar::Scalar;
pub use table_name::TableName;

/// A point in lineage time, as stored in `time_inserted`/`time_deleted`.
pub type Timestamp = i64;
