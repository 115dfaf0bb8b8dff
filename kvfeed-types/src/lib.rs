//! Core type definitions for kvfeed.
//!
//! This crate defines the configuration entities a load-balancer control
//! plane stores in the key-value store, and the change events produced
//! when those entities are written or removed:
//! - Entities: [`Host`], [`Listener`], [`Backend`], [`Frontend`]
//! - Entity keys: [`HostKey`], [`ListenerKey`], [`BackendKey`], [`FrontendKey`]
//! - The [`EntityKind`] classification unit
//! - [`ChangeEvent`], the typed upsert/delete event stream item
//!
//! Field names serialize in the PascalCase layout used by the stored JSON.

pub mod bytes;
mod entity;
mod event;
mod kind;

pub use entity::{
    Address, Backend, BackendKey, Entity, Frontend, FrontendKey, Host, HostKey, HostSettings,
    KeyPair, Listener, ListenerKey, OcspSettings,
};
pub use event::ChangeEvent;
pub use kind::EntityKind;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The entity is malformed (empty or ill-formed identifier, missing reference).
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Checks that an identifier can be used as a single key-path segment.
///
/// Identifiers must be non-empty and must not contain `/`.
pub fn validate_id(what: &str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::InvalidFormat(format!("{what} cannot be empty")));
    }
    if id.contains('/') {
        return Err(Error::InvalidFormat(format!(
            "{what} '{id}' must not contain '/'"
        )));
    }
    Ok(())
}
