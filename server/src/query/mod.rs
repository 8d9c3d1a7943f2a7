//! Lineage queries on top of the store.
//!
//! `LineageReader` combines three pieces:
//! - the schema reader (`schema.rs`): node names, rules and the catalog of
//!   collection tables of a node
//! - the time resolver (`time.rs`): the latest insertion time of a node
//! - the collection materializer (`materialize.rs`): the tuples of a
//!   collection live at a given time
//!
//! `snapshot.rs` composes them into the two request shapes the HTTP layer
//! serves.
//!
//! # Concurrency
//!
//! Reads that touch one table per collection fan out concurrently, at most
//! `max_concurrent_queries` at a time. Results always come back in catalog
//! order. No state is shared between calls; every read goes to the store.

mod materialize;
mod schema;
mod snapshot;
mod time;

pub use schema::{CatalogEntry, NodeCatalog};

use crate::store::Store;

/// Read-only query facade over a [`Store`].
#[derive(Debug, Clone)]
pub struct LineageReader {
    store: Store,
    max_concurrent_queries: usize,
}

impl LineageReader {
    /// Create a reader issuing at most `max_concurrent_queries` per-collection
    /// statements at once. A bound of zero is treated as one.
    #[must_use]
    pub fn new(store: Store, max_concurrent_queries: usize) -> Self {
        Self {
            store,
            max_concurrent_queries: max_concurrent_queries.max(1),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }
}
