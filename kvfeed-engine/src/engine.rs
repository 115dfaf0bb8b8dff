//! The engine facade: CRUD per entity kind plus the watch subscription.

use crate::codec::{EntityCodec, PlainEntity};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::path::PathScheme;
use crate::watch::WatchLoop;
use kvfeed_store::KvStore;
use kvfeed_types::{
    Backend, BackendKey, ChangeEvent, Entity, EntityKind, Frontend, FrontendKey, Host, HostKey,
    Listener, ListenerKey, validate_id,
};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// Entry point for reading, writing and watching configuration entities.
///
/// CRUD calls go straight to the store and keep no local copy, so they are
/// safe to issue concurrently with each other and with a running watch.
pub struct Engine {
    store: Arc<dyn KvStore>,
    scheme: PathScheme,
    codec: EntityCodec,
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine over `store`. Fails if the config is invalid.
    pub fn new(store: Arc<dyn KvStore>, config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let codec = EntityCodec::new(config.decode_secret_key()?);
        let scheme = PathScheme::new(&config.prefix);
        info!(
            prefix = scheme.prefix(),
            encryption = codec.supports_encryption(),
            "engine created"
        );
        Ok(Self {
            store,
            scheme,
            codec,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scheme(&self) -> &PathScheme {
        &self.scheme
    }

    /// Whether hosts carrying a key pair can be stored and read back.
    pub fn supports_encryption(&self) -> bool {
        self.codec.supports_encryption()
    }

    // ── Hosts ────────────────────────────────────────────────────

    /// Writes a host, sealing its key pair.
    pub async fn upsert_host(&self, host: &Host) -> EngineResult<()> {
        host.validate()?;
        let value = self.codec.encode_host(host)?;
        self.put(EntityKind::Host, &host.name, value).await
    }

    pub async fn get_host(&self, key: &HostKey) -> EngineResult<Host> {
        let value = self.fetch(EntityKind::Host, &key.name).await?;
        self.codec.decode_host(&value)
    }

    pub async fn delete_host(&self, key: &HostKey) -> EngineResult<()> {
        self.remove(EntityKind::Host, &key.name).await
    }

    pub async fn hosts(&self) -> EngineResult<Vec<Host>> {
        self.collect(EntityKind::Host)
            .await?
            .iter()
            .map(|value| self.codec.decode_host(value))
            .collect()
    }

    // ── Listeners ────────────────────────────────────────────────

    pub async fn upsert_listener(&self, listener: &Listener) -> EngineResult<()> {
        self.upsert_plain(listener).await
    }

    pub async fn get_listener(&self, key: &ListenerKey) -> EngineResult<Listener> {
        self.get_plain(&key.id).await
    }

    pub async fn delete_listener(&self, key: &ListenerKey) -> EngineResult<()> {
        self.remove(EntityKind::Listener, &key.id).await
    }

    pub async fn listeners(&self) -> EngineResult<Vec<Listener>> {
        self.list_plain().await
    }

    // ── Backends ─────────────────────────────────────────────────

    pub async fn upsert_backend(&self, backend: &Backend) -> EngineResult<()> {
        self.upsert_plain(backend).await
    }

    pub async fn get_backend(&self, key: &BackendKey) -> EngineResult<Backend> {
        self.get_plain(&key.id).await
    }

    pub async fn delete_backend(&self, key: &BackendKey) -> EngineResult<()> {
        self.remove(EntityKind::Backend, &key.id).await
    }

    pub async fn backends(&self) -> EngineResult<Vec<Backend>> {
        self.list_plain().await
    }

    // ── Frontends ────────────────────────────────────────────────

    pub async fn upsert_frontend(&self, frontend: &Frontend) -> EngineResult<()> {
        self.upsert_plain(frontend).await
    }

    pub async fn get_frontend(&self, key: &FrontendKey) -> EngineResult<Frontend> {
        self.get_plain(&key.id).await
    }

    pub async fn delete_frontend(&self, key: &FrontendKey) -> EngineResult<()> {
        self.remove(EntityKind::Frontend, &key.id).await
    }

    pub async fn frontends(&self) -> EngineResult<Vec<Frontend>> {
        self.list_plain().await
    }

    // ── Watch ────────────────────────────────────────────────────

    /// A fresh watch session over this engine's prefix.
    pub fn watch_loop(&self) -> WatchLoop {
        WatchLoop::new(
            Arc::clone(&self.store),
            self.scheme.clone(),
            self.codec.clone(),
            self.config.unrecognized_keys,
        )
    }

    /// Publishes change events into `events` until cancelled or failed.
    ///
    /// The first cycle reports every existing entity as upserted. See
    /// [`WatchLoop::run`] for cancellation and error semantics.
    pub async fn subscribe(
        &self,
        events: mpsc::Sender<ChangeEvent>,
        cancel: watch::Receiver<bool>,
    ) -> EngineResult<()> {
        self.watch_loop().run(events, cancel).await
    }

    // ── Internals ────────────────────────────────────────────────

    async fn upsert_plain<E: PlainEntity>(&self, entity: &E) -> EngineResult<()> {
        entity.validate()?;
        let value = self.codec.encode(entity)?;
        self.put(E::KIND, entity.id(), value).await
    }

    async fn get_plain<E: PlainEntity>(&self, id: &str) -> EngineResult<E> {
        let value = self.fetch(E::KIND, id).await?;
        self.codec.decode(&value)
    }

    async fn list_plain<E: PlainEntity>(&self) -> EngineResult<Vec<E>> {
        self.collect(E::KIND)
            .await?
            .iter()
            .map(|value| self.codec.decode(value))
            .collect()
    }

    async fn put(&self, kind: EntityKind, id: &str, value: Vec<u8>) -> EngineResult<()> {
        let key = self.scheme.path_for(kind, id);
        debug!(key = %key, bytes = value.len(), "put");
        self.store.put(&key, value).await?;
        Ok(())
    }

    async fn fetch(&self, kind: EntityKind, id: &str) -> EngineResult<Vec<u8>> {
        validate_id(&format!("{kind} id"), id)?;
        let key = self.scheme.path_for(kind, id);
        match self.store.get(&key).await? {
            Some(pair) => Ok(pair.value),
            None => Err(EngineError::NotFound(format!("{kind} '{id}'"))),
        }
    }

    /// Deleting a missing entity succeeds.
    async fn remove(&self, kind: EntityKind, id: &str) -> EngineResult<()> {
        validate_id(&format!("{kind} id"), id)?;
        let key = self.scheme.path_for(kind, id);
        debug!(key = %key, "delete");
        self.store.delete(&key).await?;
        Ok(())
    }

    /// Raw values of every stored entity of `kind`, in key order.
    async fn collect(&self, kind: EntityKind) -> EngineResult<Vec<Vec<u8>>> {
        let response = self.store.list(&self.scheme.kind_prefix(kind), 0).await?;
        Ok(response
            .pairs
            .into_iter()
            .filter(|pair| self.scheme.is_kind(&pair.key, kind))
            .map(|pair| pair.value)
            .collect())
    }
}
