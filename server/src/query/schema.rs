//! Schema reader: node names, rules and collection catalogs.

use super::LineageReader;
use crate::error::QueryError;
use crate::types::TableName;

/// A collection of a node together with the handle of its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub table: TableName,
}

/// The collections of one node, as enumerated from the store.
///
/// This is the allow-list for table access: the only way to reach a
/// collection table is through an entry of a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCatalog {
    pub node: String,
    pub entries: Vec<CatalogEntry>,
}

impl NodeCatalog {
    /// Build the catalog for `node` from the collection names the store
    /// reported for it.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::DataIntegrity` if any name cannot be used as a
    /// table identifier.
    pub(crate) fn from_names(node: &str, names: Vec<String>) -> Result<Self, QueryError> {
        let entries = names
            .into_iter()
            .map(|name| {
                let table = TableName::for_collection(node, &name)?;
                Ok(CatalogEntry { name, table })
            })
            .collect::<Result<Vec<_>, QueryError>>()?;
        Ok(Self {
            node: node.to_string(),
            entries,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collection names, in store order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    #[must_use]
    pub fn get(&self, collection: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.name == collection)
    }
}

impl LineageReader {
    /// Names of every node in the store, in store order.
    pub async fn node_names(&self) -> Result<Vec<String>, QueryError> {
        self.store.node_names().await
    }

    /// Rules of `node` ordered by `rule_number`. Empty for unknown nodes.
    pub async fn rules(&self, node: &str) -> Result<Vec<String>, QueryError> {
        self.store.rules(node).await
    }

    /// Names of the collections attached to `node`. Empty for unknown nodes.
    pub async fn list_collection_names(&self, node: &str) -> Result<Vec<String>, QueryError> {
        self.store.collection_names(node).await
    }

    /// Enumerate the collections of `node` and validate their table names.
    pub async fn catalog(&self, node: &str) -> Result<NodeCatalog, QueryError> {
        let names = self.list_collection_names(node).await?;
        tracing::debug!("node '{node}' has {} collections", names.len());
        NodeCatalog::from_names(node, names)
    }
}
