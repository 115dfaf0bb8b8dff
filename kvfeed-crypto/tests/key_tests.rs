use kvfeed_crypto::{CryptoError, KEY_SIZE, SecretKey};

#[test]
fn generated_keys_are_unique() {
    let key1 = SecretKey::generate();
    let key2 = SecretKey::generate();
    assert_ne!(key1.as_bytes(), key2.as_bytes());
}

#[test]
fn generated_key_is_32_bytes() {
    assert_eq!(SecretKey::generate().as_bytes().len(), KEY_SIZE);
}

#[test]
fn hex_roundtrip() {
    let key = SecretKey::generate();
    let encoded = key.to_hex();
    assert_eq!(encoded.len(), 64);
    let parsed = SecretKey::from_hex(&encoded).unwrap();
    assert_eq!(parsed.as_bytes(), key.as_bytes());
}

#[test]
fn hex_tolerates_surrounding_whitespace() {
    let key = SecretKey::from_bytes([7u8; 32]);
    let parsed = SecretKey::from_hex(&format!("  {}\n", key.to_hex())).unwrap();
    assert_eq!(parsed.as_bytes(), key.as_bytes());
}

#[test]
fn hex_wrong_length_fails() {
    let err = SecretKey::from_hex("abcd").unwrap_err();
    assert!(matches!(
        err,
        CryptoError::InvalidKeyLength {
            expected: 32,
            actual: 2
        }
    ));
}

#[test]
fn hex_garbage_fails() {
    let err = SecretKey::from_hex("not hex at all").unwrap_err();
    assert!(matches!(err, CryptoError::InvalidKey(_)));
}

#[test]
fn from_slice_checks_length() {
    assert!(SecretKey::from_slice(&[1u8; 16]).is_err());
    assert!(SecretKey::from_slice(&[1u8; 32]).is_ok());
}

#[test]
fn key_debug_does_not_leak_bytes() {
    let key = SecretKey::from_bytes([0xAB; 32]);
    let debug = format!("{:?}", key);
    assert!(debug.contains("REDACTED"));
    assert!(!debug.contains("171"));
}
