//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use kvfeed_store::{KeyValuePair, KvStore, ListResponse, StoreError, StoreResult};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn pair(key: &str, value: &str) -> KeyValuePair {
    KeyValuePair::new(key, value.as_bytes().to_vec(), 0)
}

pub fn snapshot(index: u64, pairs: Vec<KeyValuePair>) -> StoreResult<ListResponse> {
    Ok(ListResponse { pairs, index })
}

/// Store whose `list` replays a fixed script, then blocks forever.
///
/// Every `wait_index` it is called with is recorded. `drained` is notified
/// once the script is exhausted.
#[derive(Default)]
pub struct ScriptedStore {
    script: Mutex<VecDeque<StoreResult<ListResponse>>>,
    wait_indices: Mutex<Vec<u64>>,
    pub drained: Notify,
}

impl ScriptedStore {
    pub fn new(script: Vec<StoreResult<ListResponse>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    pub fn wait_indices(&self) -> Vec<u64> {
        self.wait_indices.lock().unwrap().clone()
    }
}

#[async_trait]
impl KvStore for ScriptedStore {
    async fn list(&self, _prefix: &str, wait_index: u64) -> StoreResult<ListResponse> {
        self.wait_indices.lock().unwrap().push(wait_index);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(response) => response,
            None => {
                self.drained.notify_one();
                std::future::pending().await
            }
        }
    }

    async fn get(&self, _key: &str) -> StoreResult<Option<KeyValuePair>> {
        Err(StoreError::Protocol("scripted store is list-only".into()))
    }

    async fn put(&self, _key: &str, _value: Vec<u8>) -> StoreResult<()> {
        Err(StoreError::Protocol("scripted store is list-only".into()))
    }

    async fn delete(&self, _key: &str) -> StoreResult<()> {
        Err(StoreError::Protocol("scripted store is list-only".into()))
    }

    async fn delete_tree(&self, _prefix: &str) -> StoreResult<()> {
        Err(StoreError::Protocol("scripted store is list-only".into()))
    }
}
