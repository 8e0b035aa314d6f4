//! Client error types.

use thiserror::Error;

use crate::query::QueryError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An availability query failed.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Rendering results failed.
    #[error("output error: {0}")]
    Output(String),

    /// Logging could not be set up.
    #[error(transparent)]
    Tracing(#[from] edtslots_core::TracingError),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(err.to_string())
    }
}
