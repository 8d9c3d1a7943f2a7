//! Safe handles for per-collection tables.
//!
//! Tuples of a collection live in a table named `<node>_<collection>`. Both
//! parts originate from outside the process, so the table identifier is never
//! spliced into SQL directly. A `TableName` can only be built from names that
//! the schema reader enumerated from the catalog, and only when both parts are
//! plain identifiers (`[A-Za-z_][A-Za-z0-9_]*`).
//!
//! # Invariants
//!
//! - The rendered identifier contains only `[a-z0-9_]` and is double quoted.
//! - The identifier is folded to lowercase, which is how Postgres resolves the
//!   unquoted `<node>_<collection>` name.
//! - The identifier is at most 63 bytes. Postgres would silently truncate a
//!   longer one, so two collections could alias the same table.

use std::fmt;

use crate::error::QueryError;

/// Longest identifier Postgres keeps (`NAMEDATALEN - 1`).
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Validated identifier of a collection table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    /// Build the table handle for `collection` of `node`.
    ///
    /// Only the schema reader calls this, with names it has just read from
    /// the catalog.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::DataIntegrity` if either part is not a plain
    /// identifier or the joined identifier is longer than 63 bytes.
    pub(crate) fn for_collection(node: &str, collection: &str) -> Result<Self, QueryError> {
        validate_identifier_part(node).map_err(|reason| {
            QueryError::DataIntegrity(format!("node name '{node}' {reason}"))
        })?;
        validate_identifier_part(collection).map_err(|reason| {
            QueryError::DataIntegrity(format!("collection name '{collection}' {reason}"))
        })?;

        let ident = format!("{node}_{collection}").to_ascii_lowercase();
        if ident.len() > MAX_IDENTIFIER_LENGTH {
            return Err(QueryError::DataIntegrity(format!(
                "table name for collection '{collection}' of node '{node}' is longer than \
                 {MAX_IDENTIFIER_LENGTH} bytes"
            )));
        }
        Ok(Self(ident))
    }

    /// The bare identifier, without quotes.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    /// Renders the quoted identifier, ready to be placed in a `FROM` clause.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

fn validate_identifier_part(part: &str) -> Result<(), &'static str> {
    let mut chars = part.chars();
    let Some(first) = chars.next() else {
        return Err("is empty");
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err("must start with a letter or underscore");
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("contains characters other than letters, digits and underscores");
    }
    Ok(())
}
