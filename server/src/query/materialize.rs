//! Collection materializer.
//!
//! A row of a collection table is live at time `T` iff
//! `time_inserted <= T AND (time_deleted IS NULL OR time_deleted > T)`.
//! The predicate itself runs in the store; this module picks the tables.

use futures::{StreamExt, TryStreamExt, stream};

use super::{CatalogEntry, LineageReader, NodeCatalog};
use crate::error::QueryError;
use crate::types::{Collection, Timestamp};

impl LineageReader {
    /// Tuples of `collection` of `node` live at `time`.
    ///
    /// The collection is looked up in the node's catalog first; a name the
    /// catalog does not list yields an empty collection, never a table access.
    pub async fn get_collection(
        &self,
        node: &str,
        collection: &str,
        time: Timestamp,
    ) -> Result<Collection, QueryError> {
        let catalog = self.catalog(node).await?;
        match catalog.get(collection) {
            Some(entry) => self.materialize(entry.clone(), time).await,
            None => {
                tracing::debug!("collection '{collection}' of node '{node}' is not in the catalog");
                Ok(Collection::empty(collection.to_string()))
            }
        }
    }

    /// Materialize every collection of the catalog at `time`, in catalog order.
    pub async fn collections_at(
        &self,
        catalog: &NodeCatalog,
        time: Timestamp,
    ) -> Result<Vec<Collection>, QueryError> {
        let reader = self.clone();
        stream::iter(catalog.entries.clone())
            .map(move |entry| {
                let reader = reader.clone();
                async move { reader.materialize(entry, time).await }
            })
            .buffered(self.max_concurrent_queries)
            .try_collect()
            .await
    }

    async fn materialize(
        &self,
        entry: CatalogEntry,
        time: Timestamp,
    ) -> Result<Collection, QueryError> {
        let tuples = self.store.live_tuples(&entry.table, time).await?;
        tracing::debug!(
            "materialized {} tuples of {} at time {time}",
            tuples.len(),
            entry.table.as_str()
        );
        Ok(Collection {
            name: entry.name,
            tuples,
        })
    }
}
