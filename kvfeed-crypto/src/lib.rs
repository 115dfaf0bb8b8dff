//! Encryption layer for kvfeed.
//!
//! Sensitive payload fields are sealed with XChaCha20-Poly1305 and wrapped
//! in a versioned [`SealedEnvelope`] before they are written to the store:
//!
//! ```text
//! {"Encryption":"secretbox.v1","Value":{"Nonce":"<base64>","Ciphertext":"<base64>"}}
//! ```
//!
//! The scheme tag lets stored data migrate to a different cipher later
//! without guessing what an old value was sealed with.

mod cipher;
mod envelope;
mod error;
mod key;

pub use cipher::{NONCE_SIZE, SealedBytes, TAG_SIZE, open_bytes, seal_bytes, seal_bytes_with_nonce};
pub use envelope::{SCHEME_SECRETBOX_V1, SealedEnvelope, open_from_json, seal_to_json};
pub use error::{CryptoError, CryptoResult};
pub use key::{KEY_SIZE, SecretKey};
