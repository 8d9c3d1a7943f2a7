#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
// Read-only HTTP query layer over a lineage store.
//
// The store records, per node, an ordered list of rules and a set of
// time-versioned collections. Clients list nodes, fetch a node's snapshot at
// its latest time, or materialize a node's collections at any past time.
//
// System components:
//  - Store: pooled Postgres/SQLite access (`store`)
//  - Query layer: schema reader, time resolver, materializer (`query`)
//  - HTTP: axum routes and JSON shapes (`server`)

pub mod config;
pub mod error;
pub mod query;
pub mod server;
pub mod store;
pub mod types;

#[cfg(test)]
mod testing;

pub use error::QueryError;
pub use query::LineageReader;
pub use store::Store;
