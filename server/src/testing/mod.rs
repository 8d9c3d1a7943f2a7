//! Seeded stores for tests.
//!
//! Each SQLite fixture lives in its own temporary directory, removed when the
//! fixture is dropped. Postgres fixtures run only when
//! `LINEAGE_TEST_POSTGRES_URL` points at a reachable server; each one gets a
//! private schema that [`PgFixture::teardown`] drops.

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use tempfile::TempDir;

use crate::query::LineageReader;
use crate::store::{Store, StoreOptions};

/// Schema plus the data every scenario test works against.
///
/// - `n0`: `c1` holds `x` (inserted at 5) and `y` (inserted at 5, deleted at
///   10); `c2` holds `z` (inserted at 7). Rules are inserted out of order.
/// - `n1`: `empty` has no rows; `typed` has one row of mixed value types
///   inserted at 3.
/// - `bad`: its only collection name is not a safe identifier.
pub const SCENARIO: &str = r"
CREATE TABLE nodes (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);
CREATE TABLE rules (node_id INTEGER NOT NULL, rule_number INTEGER NOT NULL, rule TEXT NOT NULL);
CREATE TABLE collections (node_id INTEGER NOT NULL, id INTEGER PRIMARY KEY, collection_name TEXT NOT NULL);

INSERT INTO nodes (id, name) VALUES (1, 'n0'), (2, 'n1'), (3, 'bad');
INSERT INTO rules (node_id, rule_number, rule) VALUES
    (1, 2, 'c1 <+ c2'),
    (1, 3, 'c1 <- c2'),
    (1, 1, 'c2 <= c1');
INSERT INTO collections (node_id, id, collection_name) VALUES
    (1, 1, 'c1'),
    (1, 2, 'c2'),
    (2, 3, 'empty'),
    (2, 4, 'typed'),
    (3, 5, 'x; DROP TABLE nodes');

CREATE TABLE n0_c1 (id INTEGER PRIMARY KEY, time_inserted INTEGER NOT NULL, time_deleted INTEGER, value TEXT);
INSERT INTO n0_c1 VALUES (1, 5, NULL, 'x'), (2, 5, 10, 'y');

CREATE TABLE n0_c2 (id INTEGER PRIMARY KEY, time_inserted INTEGER NOT NULL, time_deleted INTEGER, value TEXT);
INSERT INTO n0_c2 VALUES (3, 7, NULL, 'z');

CREATE TABLE n1_empty (id INTEGER PRIMARY KEY, time_inserted INTEGER NOT NULL, time_deleted INTEGER, value TEXT);

CREATE TABLE n1_typed (
    id INTEGER PRIMARY KEY,
    time_inserted INTEGER NOT NULL,
    time_deleted INTEGER,
    n INTEGER,
    f REAL,
    s TEXT,
    missing TEXT
);
INSERT INTO n1_typed VALUES (1, 3, NULL, 42, 2.5, 'hello', NULL);
";

/// A store file seeded with a SQL script.
pub struct Fixture {
    _dir: TempDir,
    url: String,
}

impl Fixture {
    /// Create a fresh database and run `script` against it.
    #[allow(clippy::expect_used)]
    pub async fn seeded(script: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("lineage.db");

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .expect("Failed to create fixture database");
        sqlx::raw_sql(script)
            .execute(&pool)
            .await
            .expect("Failed to seed fixture database");
        pool.close().await;

        Self {
            url: format!("sqlite://{}", path.display()),
            _dir: dir,
        }
    }

    /// The standard scenario, see [`SCENARIO`].
    pub async fn scenario() -> Self {
        Self::seeded(SCENARIO).await
    }

    /// Open a store over the fixture.
    #[allow(clippy::expect_used)]
    pub async fn store(&self) -> Store {
        let options = StoreOptions {
            url: self.url.clone(),
            max_connections: 4,
            acquire_timeout: std::time::Duration::from_secs(5),
        };
        Store::connect(&options)
            .await
            .expect("Failed to open fixture store")
    }

    pub async fn reader(&self) -> LineageReader {
        LineageReader::new(self.store().await, 4)
    }
}

/// Postgres rendition of [`SCENARIO`] for `n0`, plus a table covering the
/// native value types.
///
/// Bookkeeping columns are `integer`, so the `MAX` cast to `BIGINT` is
/// exercised.
pub const PG_SCENARIO: &str = r"
CREATE TABLE nodes (id integer PRIMARY KEY, name text NOT NULL UNIQUE);
CREATE TABLE rules (node_id integer NOT NULL, rule_number integer NOT NULL, rule text NOT NULL);
CREATE TABLE collections (node_id integer NOT NULL, id integer PRIMARY KEY, collection_name text NOT NULL);

INSERT INTO nodes (id, name) VALUES (1, 'n0'), (2, 'n1');
INSERT INTO rules (node_id, rule_number, rule) VALUES
    (1, 2, 'c1 <+ c2'),
    (1, 3, 'c1 <- c2'),
    (1, 1, 'c2 <= c1');
INSERT INTO collections (node_id, id, collection_name) VALUES
    (1, 1, 'c1'),
    (1, 2, 'c2'),
    (2, 3, 'typed');

CREATE TABLE n0_c1 (id integer PRIMARY KEY, time_inserted integer NOT NULL, time_deleted integer, value text);
INSERT INTO n0_c1 VALUES (1, 5, NULL, 'x'), (2, 5, 10, 'y');

CREATE TABLE n0_c2 (id integer PRIMARY KEY, time_inserted integer NOT NULL, time_deleted integer, value text);
INSERT INTO n0_c2 VALUES (3, 7, NULL, 'z');

CREATE TABLE n1_typed (
    id integer PRIMARY KEY,
    time_inserted integer NOT NULL,
    time_deleted integer,
    i int4,
    f float4,
    b bool,
    c char(3),
    bytes bytea,
    missing text
);
INSERT INTO n1_typed VALUES (1, 3, NULL, 42, 2.5, true, 'ab', decode('00ab', 'hex'), NULL);
";

static PG_SCHEMA_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A private Postgres schema seeded with a SQL script.
pub struct PgFixture {
    admin: PgPool,
    schema: String,
    store: Store,
}

impl PgFixture {
    /// Seed a fresh schema, or `None` when `LINEAGE_TEST_POSTGRES_URL` is unset.
    #[allow(clippy::expect_used)]
    pub async fn seeded(script: &str) -> Option<Self> {
        let url = std::env::var("LINEAGE_TEST_POSTGRES_URL").ok()?;
        let schema = format!(
            "lineage_test_{}_{}",
            std::process::id(),
            PG_SCHEMA_COUNTER.fetch_add(1, Ordering::Relaxed)
        );

        let admin = PgPool::connect(&url)
            .await
            .expect("Failed to connect to test Postgres");
        sqlx::raw_sql(&format!(
            "DROP SCHEMA IF EXISTS {schema} CASCADE; CREATE SCHEMA {schema};"
        ))
        .execute(&admin)
        .await
        .expect("Failed to create test schema");

        let options = PgConnectOptions::from_str(&url)
            .expect("Invalid LINEAGE_TEST_POSTGRES_URL")
            .options([("search_path", schema.as_str())]);
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .expect("Failed to open test schema pool");
        sqlx::raw_sql(script)
            .execute(&pool)
            .await
            .expect("Failed to seed test schema");

        Some(Self {
            admin,
            schema,
            store: Store::Postgres(pool),
        })
    }

    /// The Postgres scenario, see [`PG_SCENARIO`].
    pub async fn scenario() -> Option<Self> {
        Self::seeded(PG_SCENARIO).await
    }

    pub fn reader(&self) -> LineageReader {
        LineageReader::new(self.store.clone(), 4)
    }

    /// Close the pools and drop the schema.
    #[allow(clippy::expect_used)]
    pub async fn teardown(self) {
        self.store.close().await;
        sqlx::raw_sql(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.schema))
            .execute(&self.admin)
            .await
            .expect("Failed to drop test schema");
        self.admin.close().await;
    }
}
