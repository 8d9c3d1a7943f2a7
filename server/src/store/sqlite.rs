//! SQLite implementation of the store reads.
//!
//! SQLite columns are dynamically typed, so values are decoded by the
//! storage class of each individual value rather than the declared column
//! type.

use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{Row, TypeInfo, ValueRef};

use super::{BOOKKEEPING_COLUMNS, live_rows_sql, max_time_sql};
use crate::error::QueryError;
use crate::types::{Scalar, TableName, Timestamp, Tuple};

pub(super) async fn node_names(pool: &SqlitePool) -> Result<Vec<String>, QueryError> {
    let names = sqlx::query_scalar::<_, String>("SELECT name FROM nodes")
        .fetch_all(pool)
        .await?;
    Ok(names)
}

pub(super) async fn rules(pool: &SqlitePool, node: &str) -> Result<Vec<String>, QueryError> {
    let rules = sqlx::query_scalar::<_, String>(
        r"SELECT R.rule
          FROM nodes N, rules R
          WHERE N.name = ?1 AND N.id = R.node_id
          ORDER BY R.rule_number",
    )
    .bind(node)
    .fetch_all(pool)
    .await?;
    Ok(rules)
}

pub(super) async fn collection_names(
    pool: &SqlitePool,
    node: &str,
) -> Result<Vec<String>, QueryError> {
    let names = sqlx::query_scalar::<_, String>(
        r"SELECT C.collection_name
          FROM nodes N, collections C
          WHERE N.name = ?1 AND N.id = C.node_id",
    )
    .bind(node)
    .fetch_all(pool)
    .await?;
    Ok(names)
}

pub(super) async fn max_time_inserted(
    pool: &SqlitePool,
    table: &TableName,
) -> Result<Option<Timestamp>, QueryError> {
    let max = sqlx::query_scalar::<_, Option<i64>>(&max_time_sql(table))
        .fetch_one(pool)
        .await?;
    Ok(max)
}

pub(super) async fn live_tuples(
    pool: &SqlitePool,
    table: &TableName,
    time: Timestamp,
) -> Result<Vec<Tuple>, QueryError> {
    let rows = sqlx::query(&live_rows_sql(table, "?1"))
        .bind(time)
        .fetch_all(pool)
        .await?;
    rows.iter().map(|row| decode_tuple(row, table)).collect()
}

fn decode_tuple(row: &SqliteRow, table: &TableName) -> Result<Tuple, QueryError> {
    (BOOKKEEPING_COLUMNS..row.len())
        .map(|index| decode_value(row, index, table))
        .collect()
}

fn decode_value(row: &SqliteRow, index: usize, table: &TableName) -> Result<Scalar, QueryError> {
    let storage_class = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(Scalar::Null);
        }
        raw.type_info().name().to_string()
    };
    let value = match storage_class.as_str() {
        "INTEGER" => Scalar::Int(row.try_get::<i64, _>(index)?),
        "REAL" => Scalar::Float(row.try_get::<f64, _>(index)?),
        "TEXT" => Scalar::Text(row.try_get::<String, _>(index)?),
        "BLOB" => Scalar::from_bytes(&row.try_get::<Vec<u8>, _>(index)?),
        other => {
            return Err(QueryError::DataIntegrity(format!(
                "column {index} of {} holds a value of unsupported type {other}",
                table.as_str()
            )));
        }
    };
    Ok(value)
}
