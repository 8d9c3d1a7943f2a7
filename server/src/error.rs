//! Errors surfaced by the query layer and their HTTP mapping.
//!
//! Every handler returns `Result<_, QueryError>`; the `IntoResponse`
//! implementation turns the error into a JSON body of the form
//! `{"error": "<message>"}` with a status code chosen per variant.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Error returned by schema reads, time resolution and materialization.
#[derive(Debug)]
pub enum QueryError {
    /// The request itself is malformed (e.g. a non-integer `time`).
    InvalidInput(String),
    /// A maximum was requested over an empty set: the node has no
    /// collections, or none of its collections holds a row.
    EmptyAggregate { node: String },
    /// The store holds data this service refuses to handle, such as a
    /// collection name that is not a safe SQL identifier.
    DataIntegrity(String),
    /// A requested resource does not exist.
    NotFound(String),
    /// The store cannot be reached (pool closed, acquire timed out, I/O).
    Unavailable(sqlx::Error),
    /// The request-scoped deadline expired.
    Timeout,
    /// Any other error reported by the store.
    Database(sqlx::Error),
    /// Reading the static asset failed.
    Asset(std::io::Error),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::EmptyAggregate { node } => {
                write!(f, "node '{node}' has no rows to take a latest time from")
            }
            Self::DataIntegrity(msg) => write!(f, "data integrity error: {msg}"),
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::Unavailable(e) => write!(f, "store unavailable: {e}"),
            Self::Timeout => write!(f, "request timed out"),
            Self::Database(e) => write!(f, "database error: {e}"),
            Self::Asset(e) => write!(f, "failed to read static asset: {e}"),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unavailable(e) | Self::Database(e) => Some(e),
            Self::Asset(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for QueryError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => Self::Unavailable(e),
            other => Self::Database(other),
        }
    }
}

impl QueryError {
    /// HTTP status reported to the client for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::EmptyAggregate { .. }
            | Self::DataIntegrity(_)
            | Self::Database(_)
            | Self::Asset(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed with {status}: {self}");
        } else {
            tracing::warn!("rejected request with {status}: {self}");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
