//! Request-level compositions of the schema reader, time resolver and
//! materializer.

use super::LineageReader;
use crate::error::QueryError;
use crate::types::{Collection, NodeSnapshot, Timestamp};

impl LineageReader {
    /// Rules and every collection of `node`, materialized at the node's
    /// latest time.
    ///
    /// A node without rows (unknown, no collections, or only empty
    /// collections) is not an error: `time` is `None` and every collection
    /// the catalog lists comes back empty.
    pub async fn node_snapshot(&self, node: &str) -> Result<NodeSnapshot, QueryError> {
        let (rules, catalog) = tokio::try_join!(self.rules(node), self.catalog(node))?;

        let (time, collections) = match self.latest_time(&catalog).await {
            Ok(time) => (Some(time), self.collections_at(&catalog, time).await?),
            Err(QueryError::EmptyAggregate { .. }) => {
                tracing::debug!("node '{node}' has no rows, returning an empty snapshot");
                let empty = catalog
                    .names()
                    .map(|name| Collection::empty(name.to_string()))
                    .collect();
                (None, empty)
            }
            Err(e) => return Err(e),
        };

        Ok(NodeSnapshot {
            name: node.to_string(),
            rules,
            time,
            collections,
        })
    }

    /// Every collection of `node` materialized at `time`. Empty for unknown
    /// nodes.
    pub async fn collections(
        &self,
        node: &str,
        time: Timestamp,
    ) -> Result<Vec<Collection>, QueryError> {
        let catalog = self.catalog(node).await?;
        self.collections_at(&catalog, time).await
    }
}
