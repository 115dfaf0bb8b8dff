//! Engine configuration.

use crate::error::{EngineError, EngineResult};
use kvfeed_crypto::SecretKey;
use serde::{Deserialize, Serialize};

/// What a watch does with a changed key that matches no entity template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnrecognizedKeys {
    /// End the watch session with [`EngineError::Classification`].
    #[default]
    Fail,
    /// Log the key at `warn` level and keep watching.
    Skip,
}

/// Settings of one [`crate::Engine`]; every field has a default.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Root path under which all entity keys live.
    pub prefix: String,
    /// Hex-encoded 32-byte key used to seal host key pairs.
    pub secret_key: Option<String>,
    /// Policy for watched keys matching no entity template.
    pub unrecognized_keys: UnrecognizedKeys,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            prefix: "vulcand".to_string(),
            secret_key: None,
            unrecognized_keys: UnrecognizedKeys::Fail,
        }
    }
}

impl EngineConfig {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_secret_key(mut self, key: &SecretKey) -> Self {
        self.secret_key = Some(key.to_hex());
        self
    }

    pub fn with_unrecognized_keys(mut self, policy: UnrecognizedKeys) -> Self {
        self.unrecognized_keys = policy;
        self
    }

    /// Checks the prefix and decodes the secret key, if any.
    pub fn validate(&self) -> EngineResult<()> {
        if self.prefix.trim_matches('/').is_empty() {
            return Err(EngineError::Configuration(
                "key prefix cannot be empty".to_string(),
            ));
        }
        self.decode_secret_key().map(|_| ())
    }

    /// Decodes [`EngineConfig::secret_key`].
    pub fn decode_secret_key(&self) -> EngineResult<Option<SecretKey>> {
        match &self.secret_key {
            None => Ok(None),
            Some(encoded) => SecretKey::from_hex(encoded)
                .map(Some)
                .map_err(|e| EngineError::Configuration(format!("invalid secret key: {e}"))),
        }
    }
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("prefix", &self.prefix)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[REDACTED]"))
            .field("unrecognized_keys", &self.unrecognized_keys)
            .finish()
    }
}
