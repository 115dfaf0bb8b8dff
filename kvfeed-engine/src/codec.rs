//! Stored representation of entities.
//!
//! Listeners, backends and frontends are stored as their plain JSON. Hosts
//! are stored as a [`SealedHostEntry`]: the same fields, except that the key
//! pair is replaced by a sealed envelope so private key material never
//! reaches the store in the clear.

use crate::error::{EngineError, EngineResult};
use kvfeed_crypto::{SecretKey, open_from_json, seal_to_json};
use kvfeed_types::{Backend, Entity, Frontend, Host, HostSettings, KeyPair, Listener, OcspSettings};
use serde::{Deserialize, Serialize};

/// Stored form of a [`Host`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SealedHostEntry {
    pub name: String,
    #[serde(default)]
    pub settings: SealedHostSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SealedHostSettings {
    pub default: bool,
    /// JSON-encoded sealed envelope of the key pair; empty when the host has none.
    #[serde(with = "kvfeed_types::bytes")]
    pub sealed_key_pair: Vec<u8>,
    #[serde(rename = "OCSP")]
    pub ocsp: OcspSettings,
}

/// Seals the key pair of `host`, if it has one.
///
/// A host without a key pair needs no key. A host with one fails with
/// [`EngineError::Configuration`] when `key` is `None`: the secret is never
/// dropped silently.
pub fn seal_host(key: Option<&SecretKey>, host: &Host) -> EngineResult<SealedHostEntry> {
    let sealed_key_pair = match &host.settings.key_pair {
        None => Vec::new(),
        Some(key_pair) => {
            let key = key.ok_or_else(|| {
                EngineError::Configuration("this engine does not support encryption".to_string())
            })?;
            let plaintext = serde_json::to_vec(key_pair)?;
            seal_to_json(key, &plaintext)?
        }
    };

    Ok(SealedHostEntry {
        name: host.name.clone(),
        settings: SealedHostSettings {
            default: host.settings.default,
            sealed_key_pair,
            ocsp: host.settings.ocsp.clone(),
        },
    })
}

/// Inverse of [`seal_host`].
pub fn unseal_host(key: Option<&SecretKey>, entry: &SealedHostEntry) -> EngineResult<Host> {
    let key_pair = if entry.settings.sealed_key_pair.is_empty() {
        None
    } else {
        let key = key.ok_or_else(|| {
            EngineError::Configuration("need a secret key to open sealed data".to_string())
        })?;
        let plaintext = open_from_json(key, &entry.settings.sealed_key_pair)?;
        Some(serde_json::from_slice::<KeyPair>(&plaintext)?)
    };

    let host = Host::new(
        entry.name.clone(),
        HostSettings {
            default: entry.settings.default,
            key_pair,
            ocsp: entry.settings.ocsp.clone(),
        },
    )?;
    Ok(host)
}

/// Entity kinds stored as their plain JSON, without sealing.
pub trait PlainEntity: Entity {}

impl PlainEntity for Listener {}
impl PlainEntity for Backend {}
impl PlainEntity for Frontend {}

/// Per-kind (de)serialization of stored values.
#[derive(Debug, Clone, Default)]
pub struct EntityCodec {
    key: Option<SecretKey>,
}

impl EntityCodec {
    pub fn new(key: Option<SecretKey>) -> Self {
        Self { key }
    }

    /// Whether host key pairs can be sealed and opened.
    pub fn supports_encryption(&self) -> bool {
        self.key.is_some()
    }

    pub fn encode_host(&self, host: &Host) -> EngineResult<Vec<u8>> {
        let entry = seal_host(self.key.as_ref(), host)?;
        Ok(serde_json::to_vec(&entry)?)
    }

    pub fn decode_host(&self, bytes: &[u8]) -> EngineResult<Host> {
        let entry: SealedHostEntry = serde_json::from_slice(bytes)?;
        unseal_host(self.key.as_ref(), &entry)
    }

    pub fn encode<E: PlainEntity>(&self, entity: &E) -> EngineResult<Vec<u8>> {
        Ok(serde_json::to_vec(entity)?)
    }

    /// Decodes and validates a plain entity.
    pub fn decode<E: PlainEntity>(&self, bytes: &[u8]) -> EngineResult<E> {
        let entity: E = serde_json::from_slice(bytes)?;
        entity.validate()?;
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn host_with_key_pair() -> Host {
        Host::new(
            "example.com",
            HostSettings {
                default: true,
                key_pair: Some(KeyPair::new(b"-----CERT-----".to_vec(), b"-----KEY-----".to_vec())),
                ocsp: OcspSettings {
                    enabled: true,
                    period: "1h".into(),
                    ..Default::default()
                },
            },
        )
        .unwrap()
    }

    #[test]
    fn sealed_entry_never_contains_private_key() {
        let key = SecretKey::generate();
        let entry = seal_host(Some(&key), &host_with_key_pair()).unwrap();
        let stored = serde_json::to_vec(&entry).unwrap();
        let needle = b"-----KEY-----";
        assert!(!stored.windows(needle.len()).any(|w| w == needle));
        assert!(!entry.settings.sealed_key_pair.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn sealed_key_pair_is_an_envelope() {
        let key = SecretKey::generate();
        let entry = seal_host(Some(&key), &host_with_key_pair()).unwrap();
        let envelope: serde_json::Value =
            serde_json::from_slice(&entry.settings.sealed_key_pair).unwrap();
        assert_eq!(envelope["Encryption"], "secretbox.v1");
    }

    #[test]
    fn copies_plain_settings_verbatim() {
        let host = host_with_key_pair();
        let entry = seal_host(Some(&SecretKey::generate()), &host).unwrap();
        assert_eq!(entry.name, host.name);
        assert_eq!(entry.settings.default, host.settings.default);
        assert_eq!(entry.settings.ocsp, host.settings.ocsp);
    }

    #[test]
    fn host_entry_decodes_minimal_json() {
        let codec = EntityCodec::new(None);
        let host = codec
            .decode_host(br#"{"Name":"example.com","Settings":{}}"#)
            .unwrap();
        assert_eq!(host.name, "example.com");
        assert!(host.settings.key_pair.is_none());
    }

    #[test]
    fn decode_rejects_empty_identifier() {
        let codec = EntityCodec::new(None);
        let result = codec.decode::<Backend>(br#"{"Id":"","Type":"http"}"#);
        assert!(matches!(result, Err(EngineError::InvalidFormat(_))));
        let result = codec.decode_host(br#"{"Name":""}"#);
        assert!(matches!(result, Err(EngineError::InvalidFormat(_))));
    }
}
