//! Versioned envelope around sealed bytes.

use crate::cipher::{self, SealedBytes};
use crate::error::{CryptoError, CryptoResult};
use crate::key::SecretKey;
use serde::{Deserialize, Serialize};

/// Scheme tag for XChaCha20-Poly1305 sealed values.
pub const SCHEME_SECRETBOX_V1: &str = "secretbox.v1";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SealedEnvelope {
    /// Scheme tag naming the cipher used for `value`.
    pub encryption: String,
    pub value: SealedBytes,
}

impl SealedEnvelope {
    /// Seals `plaintext` under a fresh nonce.
    pub fn seal(key: &SecretKey, plaintext: &[u8]) -> CryptoResult<Self> {
        Ok(Self::wrap(cipher::seal_bytes(key, plaintext)?))
    }

    /// Wraps already sealed bytes with the current scheme tag.
    pub fn wrap(value: SealedBytes) -> Self {
        Self {
            encryption: SCHEME_SECRETBOX_V1.to_string(),
            value,
        }
    }

    /// Checks the scheme tag, then verifies and decrypts.
    pub fn open(&self, key: &SecretKey) -> CryptoResult<Vec<u8>> {
        if self.encryption != SCHEME_SECRETBOX_V1 {
            return Err(CryptoError::UnsupportedScheme(self.encryption.clone()));
        }
        cipher::open_bytes(key, &self.value)
    }

    pub fn to_json(&self) -> CryptoResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> CryptoResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Seals `plaintext` and returns the JSON-encoded envelope.
pub fn seal_to_json(key: &SecretKey, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    SealedEnvelope::seal(key, plaintext)?.to_json()
}

/// Decodes a JSON envelope and opens it.
pub fn open_from_json(key: &SecretKey, envelope: &[u8]) -> CryptoResult<Vec<u8>> {
    SealedEnvelope::from_json(envelope)?.open(key)
}
