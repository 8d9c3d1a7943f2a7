//! Read-only access to the lineage store.
//!
//! The store is a relational database holding `nodes`, `rules`,
//! `collections` and one table per (node, collection) pair. Postgres is the
//! production backend; SQLite is accepted for local development and tests.
//!
//! # Lifecycle
//!
//! A `Store` owns a process-wide connection pool. It is created once at
//! startup with [`Store::connect`] and torn down with [`Store::close`] after
//! the HTTP server has drained. Cloning a `Store` is cheap and shares the pool.
//!
//! # Invariants
//!
//! - Every statement either binds caller input as a parameter or splices a
//!   validated [`TableName`].
//! - Connections are acquired per statement and returned to the pool on every
//!   exit path, including errors and cancellation.

mod postgres;
mod sqlite;

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::QueryError;
use crate::types::{TableName, Timestamp, Tuple};

/// Settings for the connection pool.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

/// Error returned when the store cannot be opened.
#[derive(Debug)]
pub enum StoreError {
    /// The URL names a backend this server does not speak.
    UnsupportedUrl(String),
    /// The URL could not be parsed or the first connection failed.
    Connect(sqlx::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedUrl(scheme) => write!(
                f,
                "unsupported database url scheme '{scheme}'; expected postgres:// or sqlite:"
            ),
            Self::Connect(e) => write!(f, "failed to connect to store: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnsupportedUrl(_) => None,
            Self::Connect(e) => Some(e),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Connect(e)
    }
}

/// Pooled connection to the lineage store.
#[derive(Debug, Clone)]
pub enum Store {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl Store {
    /// Open the pool and establish the first connection.
    ///
    /// The backend is picked from the URL scheme.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UnsupportedUrl` for unknown schemes and
    /// `StoreError::Connect` if the store is unreachable.
    pub async fn connect(options: &StoreOptions) -> Result<Self, StoreError> {
        let scheme = options.url.split(':').next().unwrap_or_default();
        match scheme {
            "postgres" | "postgresql" => {
                let connect_options = PgConnectOptions::from_str(&options.url)?;
                let pool = PgPoolOptions::new()
                    .max_connections(options.max_connections)
                    .acquire_timeout(options.acquire_timeout)
                    .connect_with(connect_options)
                    .await?;
                Ok(Self::Postgres(pool))
            }
            "sqlite" => {
                let connect_options =
                    SqliteConnectOptions::from_str(&options.url)?.create_if_missing(false);
                let pool = SqlitePoolOptions::new()
                    .max_connections(options.max_connections)
                    .acquire_timeout(options.acquire_timeout)
                    .connect_with(connect_options)
                    .await?;
                Ok(Self::Sqlite(pool))
            }
            other => Err(StoreError::UnsupportedUrl(other.to_string())),
        }
    }

    /// Short backend name, for logging.
    #[must_use]
    pub const fn backend(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Sqlite(_) => "sqlite",
        }
    }

    /// Close the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        match self {
            Self::Postgres(pool) => pool.close().await,
            Self::Sqlite(pool) => pool.close().await,
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        match self {
            Self::Postgres(pool) => pool.is_closed(),
            Self::Sqlite(pool) => pool.is_closed(),
        }
    }

    /// Names of all nodes, in store order.
    pub async fn node_names(&self) -> Result<Vec<String>, QueryError> {
        match self {
            Self::Postgres(pool) => postgres::node_names(pool).await,
            Self::Sqlite(pool) => sqlite::node_names(pool).await,
        }
    }

    /// Rules of `node`, ordered by `rule_number`.
    pub async fn rules(&self, node: &str) -> Result<Vec<String>, QueryError> {
        match self {
            Self::Postgres(pool) => postgres::rules(pool, node).await,
            Self::Sqlite(pool) => sqlite::rules(pool, node).await,
        }
    }

    /// Names of the collections attached to `node`, in store order.
    pub async fn collection_names(&self, node: &str) -> Result<Vec<String>, QueryError> {
        match self {
            Self::Postgres(pool) => postgres::collection_names(pool, node).await,
            Self::Sqlite(pool) => sqlite::collection_names(pool, node).await,
        }
    }

    /// `MAX(time_inserted)` over `table`; `None` if the table is empty.
    pub async fn max_time_inserted(
        &self,
        table: &TableName,
    ) -> Result<Option<Timestamp>, QueryError> {
        match self {
            Self::Postgres(pool) => postgres::max_time_inserted(pool, table).await,
            Self::Sqlite(pool) => sqlite::max_time_inserted(pool, table).await,
        }
    }

    /// Value columns of every row of `table` live at `time`.
    pub async fn live_tuples(
        &self,
        table: &TableName,
        time: Timestamp,
    ) -> Result<Vec<Tuple>, QueryError> {
        match self {
            Self::Postgres(pool) => postgres::live_tuples(pool, table, time).await,
            Self::Sqlite(pool) => sqlite::live_tuples(pool, table, time).await,
        }
    }
}

/// Number of leading bookkeeping columns (`id`, `time_inserted`,
/// `time_deleted`) in every collection table.
const BOOKKEEPING_COLUMNS: usize = 3;

/// `SELECT` returning the live rows of `table`; `param` is the placeholder
/// bound to the query time.
fn live_rows_sql(table: &TableName, param: &str) -> String {
    format!(
        "SELECT * FROM {table} \
         WHERE time_inserted <= {param} AND (time_deleted IS NULL OR time_deleted > {param})"
    )
}

fn max_time_sql(table: &TableName) -> String {
    format!("SELECT CAST(MAX(time_inserted) AS BIGINT) FROM {table}")
}
