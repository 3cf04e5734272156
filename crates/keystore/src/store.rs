//! Trusted key lookup trait and in-memory implementation.
//!
//! The verifier only ever needs one operation from key storage: "given a key
//! identifier, return the public key or absent". Production uses
//! [`DirKeyStore`](crate::DirKeyStore); tests use [`MemoryKeyStore`].

use std::collections::HashMap;

use parking_lot::RwLock;
use rsa::RsaPublicKey;

use crate::error::{KeystoreError, Result};

/// Maximum accepted length for a key identifier.
pub const MAX_KEY_ID_LEN: usize = 64;

/// Validate a key identifier before it is used for any lookup.
///
/// Key ids appear inside attacker-supplied tokens and, for the directory
/// store, become part of a file name. Only `[A-Za-z0-9_-]` is accepted, and
/// the id must be non-empty and at most [`MAX_KEY_ID_LEN`] bytes.
///
/// # Errors
///
/// Returns [`KeystoreError::InvalidKeyId`] if the id is empty, over-long, or
/// contains a character outside the allowed set.
pub fn validate_key_id(kid: &str) -> Result<()> {
    if kid.is_empty() {
        return Err(KeystoreError::invalid_key_id(kid, "empty"));
    }
    if kid.len() > MAX_KEY_ID_LEN {
        return Err(KeystoreError::invalid_key_id(kid, "exceeds maximum length"));
    }
    if !kid.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_') {
        return Err(KeystoreError::invalid_key_id(kid, "illegal character"));
    }
    Ok(())
}

/// Lookup interface for trusted WLS public keys.
///
/// Implementations are read-only at request time and safe to share across
/// concurrent requests.
pub trait TrustedKeyStore: Send + Sync {
    /// Look up the public key registered under `kid`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(key))` if the key is trusted
    /// - `Ok(None)` if no key is registered under `kid`
    ///
    /// # Errors
    ///
    /// Returns [`KeystoreError::InvalidKeyId`] for ids failing
    /// [`validate_key_id`].
    fn verifying_key(&self, kid: &str) -> Result<Option<RsaPublicKey>>;
}

/// In-memory trusted key store.
///
/// Intended for tests and embedding scenarios where keys arrive from
/// somewhere other than a directory on disk.
#[derive(Default)]
pub struct MemoryKeyStore {
    keys: RwLock<HashMap<String, RsaPublicKey>>,
}

impl MemoryKeyStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` under `kid`, replacing any existing entry.
    ///
    /// # Errors
    ///
    /// Returns [`KeystoreError::InvalidKeyId`] if `kid` fails validation.
    pub fn insert_key(&self, kid: &str, key: RsaPublicKey) -> Result<()> {
        validate_key_id(kid)?;
        self.keys.write().insert(kid.to_owned(), key);
        Ok(())
    }

    /// Number of registered keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }
}

impl TrustedKeyStore for MemoryKeyStore {
    fn verifying_key(&self, kid: &str) -> Result<Option<RsaPublicKey>> {
        validate_key_id(kid)?;
        Ok(self.keys.read().get(kid).cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use rsa::RsaPrivateKey;

    use super::*;

    fn test_public_key() -> RsaPublicKey {
        let mut rng = rand_core::OsRng;
        RsaPrivateKey::new(&mut rng, 1024).expect("generate test key").to_public_key()
    }

    #[test]
    fn test_validate_key_id_accepts_typical_ids() {
        assert!(validate_key_id("2").is_ok());
        assert!(validate_key_id("901").is_ok());
        assert!(validate_key_id("raven-key_01").is_ok());
    }

    #[test]
    fn test_validate_key_id_rejects_empty() {
        assert!(matches!(
            validate_key_id(""),
            Err(KeystoreError::InvalidKeyId { ref reason, .. }) if reason == "empty"
        ));
    }

    #[test]
    fn test_validate_key_id_rejects_path_traversal() {
        assert!(validate_key_id("../../../etc/passwd").is_err());
        assert!(validate_key_id("..").is_err());
        assert!(validate_key_id("a/b").is_err());
    }

    #[test]
    fn test_validate_key_id_rejects_null_and_whitespace() {
        assert!(validate_key_id("key\0id").is_err());
        assert!(validate_key_id("key id").is_err());
        assert!(validate_key_id("key\nid").is_err());
    }

    #[test]
    fn test_validate_key_id_rejects_over_long() {
        let kid = "k".repeat(MAX_KEY_ID_LEN + 1);
        assert!(validate_key_id(&kid).is_err());
        let kid = "k".repeat(MAX_KEY_ID_LEN);
        assert!(validate_key_id(&kid).is_ok());
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryKeyStore::new();
        assert!(store.is_empty());

        let key = test_public_key();
        store.insert_key("2", key.clone()).unwrap();
        assert_eq!(store.len(), 1);

        let found = store.verifying_key("2").unwrap();
        assert_eq!(found, Some(key));
    }

    #[test]
    fn test_memory_store_absent_key() {
        let store = MemoryKeyStore::new();
        assert_eq!(store.verifying_key("missing").unwrap(), None);
    }

    #[test]
    fn test_memory_store_rejects_bad_kid_on_lookup() {
        let store = MemoryKeyStore::new();
        assert!(store.verifying_key("../2").is_err());
    }

    #[test]
    fn test_memory_store_rejects_bad_kid_on_insert() {
        let store = MemoryKeyStore::new();
        assert!(store.insert_key("bad/kid", test_public_key()).is_err());
        assert!(store.is_empty());
    }
}
