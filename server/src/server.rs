// Life of a request:
// 1. Query string comes in and is parsed into typed params
// 2. The lineage reader enumerates the node's catalog
// 3. Per-collection statements fan out against the pool
// 4. Results are serialized to JSON and returned
//
// Every request runs under the configured request timeout.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::header,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::query::LineageReader;
use crate::types::{Collection, NodeSnapshot, Timestamp};

/// Shared state of the HTTP handlers.
#[derive(Clone)]
#[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected for shared state
pub struct AppState {
    reader: LineageReader,
    /// Static front-end asset served at `/`.
    index_path: Arc<PathBuf>,
    request_timeout: Duration,
}

impl AppState {
    #[must_use]
    pub fn new(reader: LineageReader, index_path: PathBuf, request_timeout: Duration) -> Self {
        Self {
            reader,
            index_path: Arc::new(index_path),
            request_timeout,
        }
    }
}

/// Build the router serving the four lineage routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/node_names", get(node_names))
        .route("/node", get(node))
        .route("/collections", get(collections))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct NodeNamesResponse {
    node_names: Vec<String>,
}

#[derive(Debug, Serialize)]
struct NodeResponse {
    node: NodeSnapshot,
}

#[derive(Debug, Serialize)]
struct CollectionsResponse {
    collections: Vec<Collection>,
}

#[derive(Debug, Deserialize)]
struct NodeParams {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct CollectionsParams {
    #[serde(default)]
    name: String,
    #[serde(default)]
    time: Timestamp,
}

/// Run `work` under the request timeout.
async fn with_timeout<T, F>(state: &AppState, work: F) -> Result<T, QueryError>
where
    F: Future<Output = Result<T, QueryError>>,
{
    tokio::time::timeout(state.request_timeout, work)
        .await
        .map_err(|_| QueryError::Timeout)?
}

fn invalid_params(rejection: &QueryRejection) -> QueryError {
    QueryError::InvalidInput(rejection.body_text())
}

async fn index(State(state): State<AppState>) -> Result<impl IntoResponse, QueryError> {
    tracing::debug!("serving {}", state.index_path.display());
    let bytes = match tokio::fs::read(state.index_path.as_path()).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(QueryError::NotFound(state.index_path.display().to_string()));
        }
        Err(e) => return Err(QueryError::Asset(e)),
    };
    let content_type = content_type_for(&state.index_path);
    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}

fn content_type_for(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

async fn node_names(State(state): State<AppState>) -> Result<impl IntoResponse, QueryError> {
    tracing::debug!("listing node names");
    let node_names = with_timeout(&state, state.reader.node_names()).await?;
    Ok(Json(NodeNamesResponse { node_names }))
}

async fn node(
    State(state): State<AppState>,
    params: Result<Query<NodeParams>, QueryRejection>,
) -> Result<impl IntoResponse, QueryError> {
    let Query(params) = params.map_err(|rejection| invalid_params(&rejection))?;
    tracing::debug!("snapshot of node '{}'", params.name);
    let node = with_timeout(&state, state.reader.node_snapshot(&params.name)).await?;
    Ok(Json(NodeResponse { node }))
}

async fn collections(
    State(state): State<AppState>,
    params: Result<Query<CollectionsParams>, QueryRejection>,
) -> Result<impl IntoResponse, QueryError> {
    let Query(params) = params.map_err(|rejection| invalid_params(&rejection))?;
    tracing::debug!(
        "collections of node '{}' at time {}",
        params.name,
        params.time
    );
    let collections = with_timeout(
        &state,
        state.reader.collections(&params.name, params.time),
    )
    .await?;
    Ok(Json(CollectionsResponse { collections }))
}
