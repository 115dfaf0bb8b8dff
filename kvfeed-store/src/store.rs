//! The store collaborator contract.

use crate::error::StoreResult;
use async_trait::async_trait;

/// The store's unit of storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValuePair {
    pub key: String,
    pub value: Vec<u8>,
    /// Store index at which the pair was last modified. Opaque to application logic.
    pub version: u64,
}

impl KeyValuePair {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>, version: u64) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            version,
        }
    }
}

/// Full snapshot under a prefix together with the store index it reflects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListResponse {
    pub pairs: Vec<KeyValuePair>,
    pub index: u64,
}

/// A versioned, hierarchical key-value store.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Returns every pair whose key starts with `prefix`.
    ///
    /// When `wait_index` is non-zero the call blocks until the store index
    /// exceeds it or a backend-defined timeout elapses, whichever comes
    /// first. On timeout the returned index may equal `wait_index`.
    async fn list(&self, prefix: &str, wait_index: u64) -> StoreResult<ListResponse>;

    /// Reads a single key. Returns `None` if the key does not exist.
    async fn get(&self, key: &str) -> StoreResult<Option<KeyValuePair>>;

    /// Writes a value, creating or replacing the key.
    async fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()>;

    /// Removes a key. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Removes every key under `prefix`.
    async fn delete_tree(&self, prefix: &str) -> StoreResult<()>;
}
