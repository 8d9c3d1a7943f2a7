//! Postgres implementation of the store reads.

use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Column, Row, TypeInfo};

use super::{BOOKKEEPING_COLUMNS, live_rows_sql, max_time_sql};
use crate::error::QueryError;
use crate::types::{Scalar, TableName, Timestamp, Tuple};

pub(super) async fn node_names(pool: &PgPool) -> Result<Vec<String>, QueryError> {
    let names = sqlx::query_scalar::<_, String>("SELECT name FROM nodes")
        .fetch_all(pool)
        .await?;
    Ok(names)
}

pub(super) async fn rules(pool: &PgPool, node: &str) -> Result<Vec<String>, QueryError> {
    let rules = sqlx::query_scalar::<_, String>(
        r"SELECT R.rule
          FROM nodes N, rules R
          WHERE N.name = $1 AND N.id = R.node_id
          ORDER BY R.rule_number",
    )
    .bind(node)
    .fetch_all(pool)
    .await?;
    Ok(rules)
}

pub(super) async fn collection_names(pool: &PgPool, node: &str) -> Result<Vec<String>, QueryError> {
    let names = sqlx::query_scalar::<_, String>(
        r"SELECT C.collection_name
          FROM nodes N, collections C
          WHERE N.name = $1 AND N.id = C.node_id",
    )
    .bind(node)
    .fetch_all(pool)
    .await?;
    Ok(names)
}

pub(super) async fn max_time_inserted(
    pool: &PgPool,
    table: &TableName,
) -> Result<Option<Timestamp>, QueryError> {
    let max = sqlx::query_scalar::<_, Option<i64>>(&max_time_sql(table))
        .fetch_one(pool)
        .await?;
    Ok(max)
}

pub(super) async fn live_tuples(
    pool: &PgPool,
    table: &TableName,
    time: Timestamp,
) -> Result<Vec<Tuple>, QueryError> {
    let rows = sqlx::query(&live_rows_sql(table, "$1"))
        .bind(time)
        .fetch_all(pool)
        .await?;
    rows.iter().map(|row| decode_tuple(row, table)).collect()
}

fn decode_tuple(row: &PgRow, table: &TableName) -> Result<Tuple, QueryError> {
    (BOOKKEEPING_COLUMNS..row.len())
        .map(|index| decode_value(row, index, table))
        .collect()
}

/// Decode one value column according to its declared Postgres type.
fn decode_value(row: &PgRow, index: usize, table: &TableName) -> Result<Scalar, QueryError> {
    let column = &row.columns()[index];
    let value = match column.type_info().name() {
        "BOOL" => row.try_get::<Option<bool>, _>(index)?.map(Scalar::Bool),
        "\"CHAR\"" => row
            .try_get::<Option<i8>, _>(index)?
            .map(|n| Scalar::Int(i64::from(n))),
        "INT2" => row
            .try_get::<Option<i16>, _>(index)?
            .map(|n| Scalar::Int(i64::from(n))),
        "INT4" => row
            .try_get::<Option<i32>, _>(index)?
            .map(|n| Scalar::Int(i64::from(n))),
        "INT8" => row.try_get::<Option<i64>, _>(index)?.map(Scalar::Int),
        "OID" => row
            .try_get::<Option<sqlx::postgres::types::Oid>, _>(index)?
            .map(|oid| Scalar::Int(i64::from(oid.0))),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(index)?
            .map(|n| Scalar::Float(f64::from(n))),
        "FLOAT8" => row.try_get::<Option<f64>, _>(index)?.map(Scalar::Float),
        "TEXT" | "VARCHAR" | "CHAR" | "NAME" | "UNKNOWN" => {
            row.try_get::<Option<String>, _>(index)?.map(Scalar::Text)
        }
        "BYTEA" => row
            .try_get::<Option<Vec<u8>>, _>(index)?
            .map(|bytes| Scalar::from_bytes(&bytes)),
        other => {
            return Err(QueryError::DataIntegrity(format!(
                "column '{}' of {} has unsupported type {other}",
                column.name(),
                table.as_str()
            )));
        }
    };
    Ok(value.unwrap_or(Scalar::Null))
}
