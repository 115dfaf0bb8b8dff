//! Error types for the store layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Transport and protocol errors from a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The HTTP request could not be completed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with an unexpected status code.
    #[error("store returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response was missing data the protocol requires.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The store refused a write.
    #[error("write rejected for key '{0}'")]
    Rejected(String),

    /// The client could not be built from its configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}
