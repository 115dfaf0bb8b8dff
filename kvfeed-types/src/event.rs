//! Change events published by a running watch.
//!
//! An upsert carries the full decoded entity; a delete carries only the key
//! of the entity that went away.

use crate::{
    Backend, BackendKey, EntityKind, Frontend, FrontendKey, Host, HostKey, Listener, ListenerKey,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ChangeEvent {
    HostUpserted { host: Host },
    HostDeleted { host_key: HostKey },
    ListenerUpserted { listener: Listener },
    ListenerDeleted { listener_key: ListenerKey },
    BackendUpserted { backend: Backend },
    BackendDeleted { backend_key: BackendKey },
    FrontendUpserted { frontend: Frontend },
    FrontendDeleted { frontend_key: FrontendKey },
}

impl ChangeEvent {
    /// The kind of entity this event concerns.
    pub fn kind(&self) -> EntityKind {
        match self {
            ChangeEvent::HostUpserted { .. } | ChangeEvent::HostDeleted { .. } => EntityKind::Host,
            ChangeEvent::ListenerUpserted { .. } | ChangeEvent::ListenerDeleted { .. } => {
                EntityKind::Listener
            }
            ChangeEvent::BackendUpserted { .. } | ChangeEvent::BackendDeleted { .. } => {
                EntityKind::Backend
            }
            ChangeEvent::FrontendUpserted { .. } | ChangeEvent::FrontendDeleted { .. } => {
                EntityKind::Frontend
            }
        }
    }

    /// Returns true for the `*Deleted` variants.
    pub fn is_delete(&self) -> bool {
        matches!(
            self,
            ChangeEvent::HostDeleted { .. }
                | ChangeEvent::ListenerDeleted { .. }
                | ChangeEvent::BackendDeleted { .. }
                | ChangeEvent::FrontendDeleted { .. }
        )
    }

    /// Identifier of the affected entity.
    pub fn entity_id(&self) -> &str {
        match self {
            ChangeEvent::HostUpserted { host } => &host.name,
            ChangeEvent::HostDeleted { host_key } => &host_key.name,
            ChangeEvent::ListenerUpserted { listener } => &listener.id,
            ChangeEvent::ListenerDeleted { listener_key } => &listener_key.id,
            ChangeEvent::BackendUpserted { backend } => &backend.id,
            ChangeEvent::BackendDeleted { backend_key } => &backend_key.id,
            ChangeEvent::FrontendUpserted { frontend } => &frontend.id,
            ChangeEvent::FrontendDeleted { frontend_key } => &frontend_key.id,
        }
    }
}
