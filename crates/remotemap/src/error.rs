//! Error types for remote map operations.

use thiserror::Error;

/// Errors that can occur when operating on a remote map.
#[derive(Debug, Error)]
pub enum Error {
    /// No backing store is attached to the map.
    #[error("no backing store attached")]
    NoStore,

    /// The requested field does not exist in the remote hash.
    #[error("field not found: {0}")]
    FieldNotFound(String),

    /// Encoding or decoding a value failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error surfaced by the backing store (connection failure, timeout,
    /// rejected batch). Passed through verbatim, never retried here.
    #[error("store error: {0}")]
    Store(String),
}

/// Result type alias for remote map operations.
pub type Result<T> = std::result::Result<T, Error>;
