//! Consul KV storage implementation.
//!
//! Uses the Consul HTTP API (`/v1/kv`) with blocking queries for long polls.

use crate::error::{StoreError, StoreResult};
use crate::store::{KeyValuePair, KvStore, ListResponse};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Header carrying the store index of a KV response.
const INDEX_HEADER: &str = "X-Consul-Index";
const TOKEN_HEADER: &str = "X-Consul-Token";

/// Consul connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsulConfig {
    /// Base URL of the Consul agent (e.g. `http://127.0.0.1:8500`).
    pub address: String,
    /// ACL token sent with every request.
    pub token: Option<String>,
    /// How long a blocking list may wait server-side (in seconds).
    pub wait_time_secs: u64,
    /// HTTP timeout for a single request (in seconds). Must exceed the wait time.
    pub request_timeout_secs: u64,
}

impl Default for ConsulConfig {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:8500".to_string(),
            token: None,
            wait_time_secs: 300,
            request_timeout_secs: 330,
        }
    }
}

/// Consul KV API entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ConsulKv {
    key: String,
    /// Base64 value, `null` for keys stored without a body.
    value: Option<String>,
    #[serde(default)]
    modify_index: u64,
}

impl ConsulKv {
    fn into_pair(self) -> StoreResult<KeyValuePair> {
        let value = match self.value {
            Some(encoded) => STANDARD.decode(encoded.as_bytes()).map_err(|e| {
                StoreError::Protocol(format!("invalid base64 value for key '{}': {e}", self.key))
            })?,
            None => Vec::new(),
        };
        Ok(KeyValuePair::new(self.key, value, self.modify_index))
    }
}

/// Consul KV store implementation.
pub struct ConsulStore {
    config: ConsulConfig,
    client: Client,
}

impl ConsulStore {
    /// Creates a new Consul store client.
    pub fn new(config: ConsulConfig) -> StoreResult<Self> {
        if config.request_timeout_secs <= config.wait_time_secs {
            return Err(StoreError::Config(format!(
                "request timeout ({}s) must exceed the long-poll wait time ({}s)",
                config.request_timeout_secs, config.wait_time_secs
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| StoreError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ConsulConfig {
        &self.config
    }

    fn kv_url(&self, key: &str) -> String {
        format!(
            "{}/v1/kv/{}",
            self.config.address.trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.header(TOKEN_HEADER, token),
            None => request,
        }
    }

    async fn error_for_status(response: Response) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => format!("<unreadable body: {e}>"),
        };
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn index_of(response: &Response) -> StoreResult<u64> {
        let header = response
            .headers()
            .get(INDEX_HEADER)
            .ok_or_else(|| StoreError::Protocol(format!("missing {INDEX_HEADER} header")))?;
        header
            .to_str()
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| StoreError::Protocol(format!("invalid {INDEX_HEADER} header")))
    }
}

#[async_trait]
impl KvStore for ConsulStore {
    async fn list(&self, prefix: &str, wait_index: u64) -> StoreResult<ListResponse> {
        let mut request = self
            .client
            .get(self.kv_url(prefix))
            .query(&[("recurse", "true")]);
        if wait_index > 0 {
            request = request.query(&[
                ("index", wait_index.to_string()),
                ("wait", format!("{}s", self.config.wait_time_secs)),
            ]);
        }

        debug!(prefix, wait_index, "consul list");
        let response = self.authorized(request).send().await?;

        // An empty prefix is a 404 that still carries the index.
        if response.status() == StatusCode::NOT_FOUND {
            let index = Self::index_of(&response)?;
            return Ok(ListResponse {
                pairs: Vec::new(),
                index,
            });
        }

        let response = Self::error_for_status(response).await?;
        let index = Self::index_of(&response)?;
        let entries: Vec<ConsulKv> = response.json().await?;
        let pairs = entries
            .into_iter()
            .map(ConsulKv::into_pair)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(ListResponse { pairs, index })
    }

    async fn get(&self, key: &str) -> StoreResult<Option<KeyValuePair>> {
        let request = self.client.get(self.kv_url(key));
        let response = self.authorized(request).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::error_for_status(response).await?;
        let entries: Vec<ConsulKv> = response.json().await?;
        // Consul stores keys without a leading `/`.
        let wanted = key.trim_start_matches('/');
        entries
            .into_iter()
            .find(|entry| entry.key == wanted)
            .map(ConsulKv::into_pair)
            .transpose()
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        let request = self.client.put(self.kv_url(key)).body(value);
        let response = self.authorized(request).send().await?;
        let response = Self::error_for_status(response).await?;

        // Consul answers `true` or `false` for plain writes.
        let body = response.text().await?;
        if body.trim() == "false" {
            return Err(StoreError::Rejected(key.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let request = self.client.delete(self.kv_url(key));
        let response = self.authorized(request).send().await?;
        Self::error_for_status(response).await?;
        Ok(())
    }

    async fn delete_tree(&self, prefix: &str) -> StoreResult<()> {
        let request = self
            .client
            .delete(self.kv_url(prefix))
            .query(&[("recurse", "true")]);
        let response = self.authorized(request).send().await?;
        Self::error_for_status(response).await?;
        Ok(())
    }
}
