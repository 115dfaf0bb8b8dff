//! Long-poll watch session.
//!
//! A [`WatchLoop`] repeatedly lists the engine prefix with the last seen
//! store index, diffs each new snapshot against its shadow and publishes one
//! [`ChangeEvent`] per changed key. Upserts of a cycle are published before
//! its deletes.
//!
//! The loop is single-task: one poll in flight at a time, and event
//! publication blocks on the consumer, so a slow consumer delays the next
//! poll.

use crate::codec::EntityCodec;
use crate::config::UnrecognizedKeys;
use crate::error::{EngineError, EngineResult};
use crate::path::{PathScheme, ResolvedKey};
use crate::shadow::ShadowDiffEngine;
use kvfeed_store::{KeyValuePair, KvStore, ListResponse};
use kvfeed_types::{
    Backend, BackendKey, ChangeEvent, Entity, Frontend, FrontendKey, HostKey, Listener, ListenerKey,
};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Outcome of a step that can observe cancellation.
enum Step {
    Continue,
    Cancelled,
}

pub struct WatchLoop {
    store: Arc<dyn KvStore>,
    scheme: PathScheme,
    codec: EntityCodec,
    unrecognized: UnrecognizedKeys,
    diff: ShadowDiffEngine,
    last_index: u64,
}

impl WatchLoop {
    pub fn new(
        store: Arc<dyn KvStore>,
        scheme: PathScheme,
        codec: EntityCodec,
        unrecognized: UnrecognizedKeys,
    ) -> Self {
        Self {
            store,
            scheme,
            codec,
            unrecognized,
            diff: ShadowDiffEngine::new(),
            last_index: 0,
        }
    }

    /// Store index the next poll waits on. Zero before the first poll.
    pub fn last_index(&self) -> u64 {
        self.last_index
    }

    /// The retained snapshot of the last completed cycle.
    pub fn shadow(&self) -> &ShadowDiffEngine {
        &self.diff
    }

    /// Runs until cancelled or until an error ends the session.
    ///
    /// Setting `cancel` to `true`, or dropping its sender, stops the loop.
    /// Cancellation interrupts an in-flight poll or a blocked send; events
    /// of a partially published cycle are dropped. Returns `Ok(())` on
    /// cancellation. Store failures are returned unchanged with no retry.
    pub async fn run(
        &mut self,
        events: mpsc::Sender<ChangeEvent>,
        mut cancel: watch::Receiver<bool>,
    ) -> EngineResult<()> {
        let prefix = self.scheme.watch_prefix();
        info!(prefix = %prefix, "watch started");

        loop {
            if is_cancelled(&cancel) {
                break;
            }

            debug!(prefix = %prefix, wait_index = self.last_index, "polling");
            let response = tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => break,
                result = self.store.list(&prefix, self.last_index) => result?,
            };

            if let Step::Cancelled = self.handle_response(response, &events, &mut cancel).await? {
                break;
            }
        }

        info!(prefix = %prefix, last_index = self.last_index, "watch cancelled");
        Ok(())
    }

    async fn handle_response(
        &mut self,
        response: ListResponse,
        events: &mpsc::Sender<ChangeEvent>,
        cancel: &mut watch::Receiver<bool>,
    ) -> EngineResult<Step> {
        let ListResponse { pairs, index } = response;

        if self.last_index != 0 && index == self.last_index {
            debug!(index, "no-op wake");
            return Ok(Step::Continue);
        }
        if index < self.last_index {
            warn!(
                previous = self.last_index,
                index, "store index went backwards, adopting it"
            );
        }
        // Waiting on index 0 never blocks.
        self.last_index = index.max(1);

        let changes = self.diff.reconcile(pairs);
        if changes.is_empty() {
            debug!(index, "index advanced without changes under prefix");
            return Ok(Step::Continue);
        }
        info!(
            index,
            upserts = changes.upserts.len(),
            deletes = changes.deletes.len(),
            "snapshot changed"
        );

        for pair in &changes.upserts {
            let Some(event) = self.classify(pair, false)? else {
                continue;
            };
            if let Step::Cancelled = publish(events, event, cancel).await? {
                return Ok(Step::Cancelled);
            }
        }
        for pair in &changes.deletes {
            let Some(event) = self.classify(pair, true)? else {
                continue;
            };
            if let Step::Cancelled = publish(events, event, cancel).await? {
                return Ok(Step::Cancelled);
            }
        }
        Ok(Step::Continue)
    }

    /// Maps a changed pair to its event. `None` means the key was skipped.
    fn classify(&self, pair: &KeyValuePair, deleted: bool) -> EngineResult<Option<ChangeEvent>> {
        let resolved = self.scheme.resolve(&pair.key);
        let event = match (resolved, deleted) {
            (ResolvedKey::Unrecognized, _) => {
                return match self.unrecognized {
                    UnrecognizedKeys::Fail => Err(EngineError::Classification {
                        key: pair.key.clone(),
                    }),
                    UnrecognizedKeys::Skip => {
                        warn!(key = %pair.key, "skipping unrecognized key");
                        Ok(None)
                    }
                };
            }

            (ResolvedKey::Host(name), true) => ChangeEvent::HostDeleted {
                host_key: HostKey::new(name),
            },
            (ResolvedKey::Listener(id), true) => ChangeEvent::ListenerDeleted {
                listener_key: ListenerKey::new(id),
            },
            (ResolvedKey::Backend(id), true) => ChangeEvent::BackendDeleted {
                backend_key: BackendKey::new(id),
            },
            (ResolvedKey::Frontend(id), true) => ChangeEvent::FrontendDeleted {
                frontend_key: FrontendKey::new(id),
            },

            (ResolvedKey::Host(name), false) => {
                let host = self.codec.decode_host(&pair.value)?;
                ensure_same_id(&pair.key, &name, &host)?;
                ChangeEvent::HostUpserted { host }
            }
            (ResolvedKey::Listener(id), false) => {
                let listener: Listener = self.codec.decode(&pair.value)?;
                ensure_same_id(&pair.key, &id, &listener)?;
                ChangeEvent::ListenerUpserted { listener }
            }
            (ResolvedKey::Backend(id), false) => {
                let backend: Backend = self.codec.decode(&pair.value)?;
                ensure_same_id(&pair.key, &id, &backend)?;
                ChangeEvent::BackendUpserted { backend }
            }
            (ResolvedKey::Frontend(id), false) => {
                let frontend: Frontend = self.codec.decode(&pair.value)?;
                ensure_same_id(&pair.key, &id, &frontend)?;
                ChangeEvent::FrontendUpserted { frontend }
            }
        };
        Ok(Some(event))
    }
}

fn ensure_same_id<E: Entity>(key: &str, path_id: &str, entity: &E) -> EngineResult<()> {
    if entity.id() != path_id {
        return Err(EngineError::InvalidFormat(format!(
            "{} '{}' stored under key '{key}'",
            E::KIND,
            entity.id()
        )));
    }
    Ok(())
}

async fn publish(
    events: &mpsc::Sender<ChangeEvent>,
    event: ChangeEvent,
    cancel: &mut watch::Receiver<bool>,
) -> EngineResult<Step> {
    debug!(kind = %event.kind(), id = event.entity_id(), delete = event.is_delete(), "publishing");
    tokio::select! {
        biased;
        _ = cancelled(cancel) => Ok(Step::Cancelled),
        sent = events.send(event) => match sent {
            Ok(()) => Ok(Step::Continue),
            Err(_) => Err(EngineError::ChannelClosed),
        },
    }
}

fn is_cancelled(cancel: &watch::Receiver<bool>) -> bool {
    *cancel.borrow() || cancel.has_changed().is_err()
}

/// Resolves once `cancel` is set or its sender is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let _ = cancel.wait_for(|set| *set).await;
}
