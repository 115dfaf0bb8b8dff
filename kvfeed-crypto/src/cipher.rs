//! Authenticated encryption using XChaCha20-Poly1305.
//!
//! The 24-byte nonce is large enough to draw at random for every seal.

use crate::error::{CryptoError, CryptoResult};
use crate::key::SecretKey;
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Size of nonce in bytes (192 bits for XChaCha20-Poly1305).
pub const NONCE_SIZE: usize = 24;

/// Size of authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// A nonce and the ciphertext (with appended tag) it was sealed under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SealedBytes {
    #[serde(with = "kvfeed_types::bytes", default)]
    pub nonce: Vec<u8>,
    #[serde(with = "kvfeed_types::bytes", default)]
    pub ciphertext: Vec<u8>,
}

/// Seals `plaintext` under a freshly drawn random nonce.
pub fn seal_bytes(key: &SecretKey, plaintext: &[u8]) -> CryptoResult<SealedBytes> {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    seal_bytes_with_nonce(key, &nonce, plaintext)
}

/// Seals `plaintext` under a caller-chosen nonce.
///
/// Reusing a nonce with the same key breaks confidentiality; this exists for
/// reproducible fixtures, production code uses [`seal_bytes`].
pub fn seal_bytes_with_nonce(
    key: &SecretKey,
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
) -> CryptoResult<SealedBytes> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let ciphertext = cipher
        .encrypt(XNonce::from_slice(nonce), plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(SealedBytes {
        nonce: nonce.to_vec(),
        ciphertext,
    })
}

/// Verifies and decrypts sealed bytes.
pub fn open_bytes(key: &SecretKey, sealed: &SealedBytes) -> CryptoResult<Vec<u8>> {
    if sealed.nonce.len() != NONCE_SIZE {
        return Err(CryptoError::Decryption(format!(
            "invalid nonce length: expected {NONCE_SIZE}, got {}",
            sealed.nonce.len()
        )));
    }

    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    cipher
        .decrypt(XNonce::from_slice(&sealed.nonce), sealed.ciphertext.as_ref())
        .map_err(|_| {
            CryptoError::Decryption("decryption failed (wrong key or tampered data)".to_string())
        })
}
