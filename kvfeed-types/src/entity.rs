//! Configuration entities and their keys.
//!
//! Every entity carries a stable identifier unique within its kind: `Name`
//! for hosts and `Id` for everything else. Identifiers double as key-path
//! segments, so they are validated with [`crate::validate_id`] before any
//! write.

use crate::{EntityKind, Error, Result, validate_id};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Common surface of the stored entity kinds.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The kind this entity type is classified as.
    const KIND: EntityKind;

    /// The identifier used in the entity's key path.
    fn id(&self) -> &str;

    /// Rejects entities that must never reach the store.
    fn validate(&self) -> Result<()> {
        validate_id(&format!("{} id", Self::KIND), self.id())
    }
}

// ── Host ─────────────────────────────────────────────────────────

/// A TLS certificate and its private key, both PEM bytes.
///
/// The private key is sensitive: it is only ever persisted sealed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyPair {
    #[serde(with = "crate::bytes", default)]
    pub cert: Vec<u8>,
    #[serde(with = "crate::bytes", default)]
    pub key: Vec<u8>,
}

impl KeyPair {
    pub fn new(cert: impl Into<Vec<u8>>, key: impl Into<Vec<u8>>) -> Self {
        Self {
            cert: cert.into(),
            key: key.into(),
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("cert", &format_args!("{} bytes", self.cert.len()))
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// OCSP stapling settings for a host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OcspSettings {
    pub enabled: bool,
    /// Refresh period as a duration string, e.g. `"1h"`.
    pub period: String,
    pub responders: Vec<String>,
    pub skip_signature_check: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct HostSettings {
    /// Whether this host serves as the default for unmatched SNI names.
    pub default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_pair: Option<KeyPair>,
    #[serde(rename = "OCSP")]
    pub ocsp: OcspSettings,
}

/// A virtual host, identified by its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Host {
    pub name: String,
    #[serde(default)]
    pub settings: HostSettings,
}

impl Host {
    /// Creates a validated host.
    pub fn new(name: impl Into<String>, settings: HostSettings) -> Result<Self> {
        let host = Self {
            name: name.into(),
            settings,
        };
        host.validate()?;
        Ok(host)
    }

    pub fn key(&self) -> HostKey {
        HostKey {
            name: self.name.clone(),
        }
    }
}

impl Entity for Host {
    const KIND: EntityKind = EntityKind::Host;

    fn id(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        validate_id("hostname", &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostKey {
    pub name: String,
}

impl HostKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for HostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host({})", self.name)
    }
}

// ── Listener ─────────────────────────────────────────────────────

/// A network address such as `tcp` / `0.0.0.0:443`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Address {
    pub network: String,
    pub address: String,
}

/// A socket the load balancer accepts connections on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Listener {
    pub id: String,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub address: Address,
    /// Routing expression limiting which requests this listener serves.
    #[serde(default)]
    pub scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<serde_json::Value>,
}

impl Listener {
    pub fn new(
        id: impl Into<String>,
        protocol: impl Into<String>,
        network: impl Into<String>,
        address: impl Into<String>,
    ) -> Result<Self> {
        let listener = Self {
            id: id.into(),
            protocol: protocol.into(),
            address: Address {
                network: network.into(),
                address: address.into(),
            },
            scope: String::new(),
            settings: None,
        };
        listener.validate()?;
        Ok(listener)
    }

    pub fn key(&self) -> ListenerKey {
        ListenerKey::new(self.id.clone())
    }
}

impl Entity for Listener {
    const KIND: EntityKind = EntityKind::Listener;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListenerKey {
    pub id: String,
}

impl ListenerKey {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl fmt::Display for ListenerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener({})", self.id)
    }
}

// ── Backend ──────────────────────────────────────────────────────

/// A pool of upstream servers that frontends route to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Backend {
    pub id: String,
    #[serde(default)]
    pub r#type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<serde_json::Value>,
}

impl Backend {
    pub fn new(id: impl Into<String>, r#type: impl Into<String>) -> Result<Self> {
        let backend = Self {
            id: id.into(),
            r#type: r#type.into(),
            settings: None,
        };
        backend.validate()?;
        Ok(backend)
    }

    pub fn key(&self) -> BackendKey {
        BackendKey::new(self.id.clone())
    }
}

impl Entity for Backend {
    const KIND: EntityKind = EntityKind::Backend;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BackendKey {
    pub id: String,
}

impl BackendKey {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl fmt::Display for BackendKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "backend({})", self.id)
    }
}

// ── Frontend ─────────────────────────────────────────────────────

/// A route matched against incoming requests, bound to one backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Frontend {
    pub id: String,
    #[serde(default)]
    pub route: String,
    #[serde(default)]
    pub r#type: String,
    #[serde(default)]
    pub backend_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<serde_json::Value>,
}

impl Frontend {
    pub fn new(
        id: impl Into<String>,
        backend_id: impl Into<String>,
        route: impl Into<String>,
    ) -> Result<Self> {
        let frontend = Self {
            id: id.into(),
            route: route.into(),
            r#type: "http".to_string(),
            backend_id: backend_id.into(),
            settings: None,
        };
        frontend.validate()?;
        Ok(frontend)
    }

    pub fn key(&self) -> FrontendKey {
        FrontendKey::new(self.id.clone())
    }
}

impl Entity for Frontend {
    const KIND: EntityKind = EntityKind::Frontend;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<()> {
        validate_id("frontend id", &self.id)?;
        if self.backend_id.is_empty() {
            return Err(Error::InvalidFormat(format!(
                "frontend '{}' must reference a backend",
                self.id
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FrontendKey {
    pub id: String,
}

impl FrontendKey {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl fmt::Display for FrontendKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frontend({})", self.id)
    }
}
