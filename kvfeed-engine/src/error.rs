//! Error types for the engine.

use kvfeed_crypto::CryptoError;
use kvfeed_store::StoreError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by CRUD calls and by a watch session.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Caller-supplied entity is malformed; nothing was written.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Sealing or unsealing needs a secret key this engine was not given.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A changed key under the watched prefix matches no entity template.
    #[error("unrecognized key: {key}")]
    Classification { key: String },

    /// The requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Sealed envelope could not be opened or created.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Transport or protocol failure from the store, passed through as is.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Stored JSON could not be decoded or an entity could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The event consumer dropped its receiver.
    #[error("event channel closed")]
    ChannelClosed,
}

impl From<kvfeed_types::Error> for EngineError {
    fn from(err: kvfeed_types::Error) -> Self {
        match err {
            kvfeed_types::Error::InvalidFormat(msg) => EngineError::InvalidFormat(msg),
            kvfeed_types::Error::Serialization(e) => EngineError::Serialization(e),
        }
    }
}
