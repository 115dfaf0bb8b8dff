use kvfeed_crypto::{
    CryptoError, NONCE_SIZE, SCHEME_SECRETBOX_V1, SealedBytes, SealedEnvelope, SecretKey, TAG_SIZE,
    open_bytes, open_from_json, seal_bytes, seal_bytes_with_nonce, seal_to_json,
};

#[test]
fn seal_open_roundtrip() {
    let key = SecretKey::generate();
    let sealed = seal_to_json(&key, b"Hello, World!").unwrap();
    let opened = open_from_json(&key, &sealed).unwrap();
    assert_eq!(opened, b"Hello, World!");
}

#[test]
fn seal_open_empty() {
    let key = SecretKey::generate();
    let sealed = SealedEnvelope::seal(&key, b"").unwrap();
    assert_eq!(sealed.open(&key).unwrap(), b"");
}

#[test]
fn envelope_wire_format() {
    let key = SecretKey::generate();
    let sealed = seal_to_json(&key, b"payload").unwrap();
    let json: serde_json::Value = serde_json::from_slice(&sealed).unwrap();

    assert_eq!(json["Encryption"], "secretbox.v1");
    assert!(json["Value"]["Nonce"].is_string());
    assert!(json["Value"]["Ciphertext"].is_string());
}

#[test]
fn sealing_is_deterministic_for_fixed_nonce() {
    let key = SecretKey::from_bytes([3u8; 32]);
    let nonce = [9u8; NONCE_SIZE];
    let a = seal_bytes_with_nonce(&key, &nonce, b"same").unwrap();
    let b = seal_bytes_with_nonce(&key, &nonce, b"same").unwrap();
    assert_eq!(a, b);

    let env_a = SealedEnvelope::wrap(a).to_json().unwrap();
    let env_b = SealedEnvelope::wrap(b).to_json().unwrap();
    assert_eq!(env_a, env_b);
}

#[test]
fn sealing_draws_fresh_nonces() {
    let key = SecretKey::generate();
    let a = seal_bytes(&key, b"same").unwrap();
    let b = seal_bytes(&key, b"same").unwrap();
    assert_ne!(a.nonce, b.nonce);
    assert_ne!(a.ciphertext, b.ciphertext);
}

#[test]
fn ciphertext_carries_tag() {
    let key = SecretKey::generate();
    let sealed = seal_bytes(&key, b"1234").unwrap();
    assert_eq!(sealed.nonce.len(), NONCE_SIZE);
    assert_eq!(sealed.ciphertext.len(), 4 + TAG_SIZE);
}

#[test]
fn wrong_key_is_decryption_error() {
    let sealed = seal_to_json(&SecretKey::generate(), b"secret").unwrap();
    let err = open_from_json(&SecretKey::generate(), &sealed).unwrap_err();
    assert!(matches!(err, CryptoError::Decryption(_)));
}

#[test]
fn tampered_ciphertext_is_decryption_error() {
    let key = SecretKey::generate();
    let mut envelope = SealedEnvelope::seal(&key, b"secret").unwrap();
    envelope.value.ciphertext[0] ^= 0x01;
    let err = envelope.open(&key).unwrap_err();
    assert!(matches!(err, CryptoError::Decryption(_)));
}

#[test]
fn wrong_nonce_length_is_decryption_error() {
    let key = SecretKey::generate();
    let mut sealed = seal_bytes(&key, b"secret").unwrap();
    sealed.nonce.truncate(12);
    let err = open_bytes(&key, &sealed).unwrap_err();
    assert!(matches!(err, CryptoError::Decryption(_)));
    assert!(err.to_string().contains("nonce"));
}

#[test]
fn unknown_scheme_is_rejected() {
    let key = SecretKey::generate();
    let mut envelope = SealedEnvelope::seal(&key, b"secret").unwrap();
    envelope.encryption = "aes.v7".to_string();
    let err = envelope.open(&key).unwrap_err();
    assert!(matches!(err, CryptoError::UnsupportedScheme(ref s) if s == "aes.v7"));
    assert!(err.to_string().contains("aes.v7"));
}

#[test]
fn unknown_scheme_is_checked_before_decrypting() {
    // A foreign scheme with garbage payload still reports the scheme, not a decryption failure.
    let envelope = br#"{"Encryption":"other","Value":{"Nonce":null,"Ciphertext":null}}"#;
    let err = open_from_json(&SecretKey::generate(), envelope).unwrap_err();
    assert!(matches!(err, CryptoError::UnsupportedScheme(_)));
}

#[test]
fn malformed_envelope_is_serialization_error() {
    let err = open_from_json(&SecretKey::generate(), b"not json").unwrap_err();
    assert!(matches!(err, CryptoError::Serialization(_)));
}

#[test]
fn envelope_serde_roundtrip() {
    let envelope = SealedEnvelope::wrap(SealedBytes {
        nonce: vec![1; NONCE_SIZE],
        ciphertext: vec![2; 20],
    });
    let json = envelope.to_json().unwrap();
    let parsed = SealedEnvelope::from_json(&json).unwrap();
    assert_eq!(parsed, envelope);
    assert_eq!(parsed.encryption, SCHEME_SECRETBOX_V1);
}

#[test]
fn error_display() {
    assert!(
        CryptoError::Decryption("tampered".into())
            .to_string()
            .contains("decryption failed")
    );
    assert!(
        CryptoError::UnsupportedScheme("x".into())
            .to_string()
            .contains("unsupported encryption type")
    );
    let msg = CryptoError::InvalidKeyLength {
        expected: 32,
        actual: 16,
    }
    .to_string();
    assert!(msg.contains("32") && msg.contains("16"));
}
