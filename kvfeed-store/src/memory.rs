//! In-process store with long-poll semantics.
//!
//! Every mutation bumps a single store-wide index, like the raft index of a
//! Consul cluster. A blocked [`KvStore::list`] wakes when the index passes its
//! `wait_index` or when `wait_timeout` elapses.

use crate::error::StoreResult;
use crate::store::{KeyValuePair, KvStore, ListResponse};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tracing::debug;

/// Default long-poll timeout for [`MemoryStore::new`].
const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
struct StoredValue {
    value: Vec<u8>,
    modify_index: u64,
}

pub struct MemoryStore {
    pairs: RwLock<BTreeMap<String, StoredValue>>,
    index_tx: watch::Sender<u64>,
    wait_timeout: Duration,
}

impl MemoryStore {
    /// Creates an empty store with the default long-poll timeout.
    pub fn new() -> Self {
        Self::with_wait_timeout(DEFAULT_WAIT_TIMEOUT)
    }

    /// Creates an empty store whose blocking lists give up after `wait_timeout`.
    pub fn with_wait_timeout(wait_timeout: Duration) -> Self {
        // Index 0 means "don't block", so a fresh store starts at 1.
        let (index_tx, _) = watch::channel(1);
        Self {
            pairs: RwLock::new(BTreeMap::new()),
            index_tx,
            wait_timeout,
        }
    }

    /// Current store index.
    pub fn index(&self) -> u64 {
        *self.index_tx.borrow()
    }

    /// Number of keys currently stored.
    pub async fn len(&self) -> usize {
        self.pairs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pairs.read().await.is_empty()
    }

    fn bump_index(&self) -> u64 {
        let mut next = 0;
        self.index_tx.send_modify(|index| {
            *index += 1;
            next = *index;
        });
        next
    }

    async fn wait_for_index_above(&self, wait_index: u64) {
        let mut rx = self.index_tx.subscribe();
        let wait = async {
            loop {
                let current = *rx.borrow_and_update();
                if current > wait_index {
                    break;
                }
                // The sender lives as long as `self`, so this only fails on teardown.
                if rx.changed().await.is_err() {
                    break;
                }
            }
        };
        if tokio::time::timeout(self.wait_timeout, wait).await.is_err() {
            debug!(wait_index, "long poll timed out");
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn list(&self, prefix: &str, wait_index: u64) -> StoreResult<ListResponse> {
        if wait_index > 0 {
            self.wait_for_index_above(wait_index).await;
        }

        let pairs = self.pairs.read().await;
        let index = self.index();
        let snapshot = pairs
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, stored)| {
                KeyValuePair::new(key.clone(), stored.value.clone(), stored.modify_index)
            })
            .collect();

        Ok(ListResponse {
            pairs: snapshot,
            index,
        })
    }

    async fn get(&self, key: &str) -> StoreResult<Option<KeyValuePair>> {
        let pairs = self.pairs.read().await;
        Ok(pairs
            .get(key)
            .map(|stored| KeyValuePair::new(key, stored.value.clone(), stored.modify_index)))
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        let mut pairs = self.pairs.write().await;
        let modify_index = self.bump_index();
        pairs.insert(
            key.to_string(),
            StoredValue {
                value,
                modify_index,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut pairs = self.pairs.write().await;
        if pairs.remove(key).is_some() {
            self.bump_index();
        }
        Ok(())
    }

    async fn delete_tree(&self, prefix: &str) -> StoreResult<()> {
        let mut pairs = self.pairs.write().await;
        let before = pairs.len();
        pairs.retain(|key, _| !key.starts_with(prefix));
        if pairs.len() != before {
            self.bump_index();
        }
        Ok(())
    }
}
