//! Time resolver.

use futures::{StreamExt, TryStreamExt, stream};

use super::{LineageReader, NodeCatalog};
use crate::error::QueryError;
use crate::types::Timestamp;

impl LineageReader {
    /// Latest `time_inserted` across all collections of the node.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::EmptyAggregate` if the catalog is empty or none
    /// of its tables holds a row; there is no maximum to report then.
    pub async fn latest_time(&self, catalog: &NodeCatalog) -> Result<Timestamp, QueryError> {
        let store = self.store.clone();
        let maxima: Vec<Option<Timestamp>> = stream::iter(catalog.entries.clone())
            .map(move |entry| {
                let store = store.clone();
                async move { store.max_time_inserted(&entry.table).await }
            })
            .buffered(self.max_concurrent_queries)
            .try_collect()
            .await?;

        maxima
            .into_iter()
            .flatten()
            .max()
            .ok_or_else(|| QueryError::EmptyAggregate {
                node: catalog.node.clone(),
            })
    }
}
