//! Directory-backed trusted key store.
//!
//! Loads every PEM public key found in a configured directory once at
//! construction. Files are named `<kid>.pem` or `<kid>.crt`; the stem is the
//! key identifier used for lookup. After construction the store is immutable
//! and lookups never touch the disk, so it can be shared read-only across
//! worker threads.

use std::{collections::HashMap, fs, path::Path};

use rsa::{RsaPublicKey, pkcs1::DecodeRsaPublicKey, pkcs8::DecodePublicKey};

use crate::{
    error::{KeystoreError, Result},
    store::{TrustedKeyStore, validate_key_id},
};

/// File extensions recognised as key material.
const KEY_EXTENSIONS: &[&str] = &["pem", "crt"];

/// Immutable trusted key store loaded from a directory of PEM files.
pub struct DirKeyStore {
    keys: HashMap<String, RsaPublicKey>,
}

impl DirKeyStore {
    /// Load all keys from `dir`.
    ///
    /// Each `<kid>.pem` / `<kid>.crt` file must contain an RSA public key in
    /// SPKI PEM (`BEGIN PUBLIC KEY`) or PKCS#1 PEM (`BEGIN RSA PUBLIC KEY`)
    /// form. Files with other extensions are ignored; files whose stem is not
    /// a valid key id are skipped with a warning rather than trusted under a
    /// mangled name.
    ///
    /// # Errors
    ///
    /// Returns [`KeystoreError::Io`] if the directory or a key file cannot be
    /// read, or [`KeystoreError::InvalidKey`] if key material fails to parse.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut keys = HashMap::new();

        let entries = fs::read_dir(dir).map_err(|e| KeystoreError::io(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| KeystoreError::io(dir, e))?;
            let path = entry.path();

            let is_key_file = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| KEY_EXTENSIONS.contains(&ext));
            if !is_key_file {
                continue;
            }

            let Some(kid) = path.file_stem().and_then(|stem| stem.to_str()) else {
                tracing::warn!(path = %path.display(), "skipping key file with unusable name");
                continue;
            };
            if let Err(e) = validate_key_id(kid) {
                tracing::warn!(path = %path.display(), error = %e, "skipping key file");
                continue;
            }

            let pem = fs::read_to_string(&path).map_err(|e| KeystoreError::io(&path, e))?;
            let key = parse_public_key_pem(kid, &pem)?;
            tracing::debug!(kid, path = %path.display(), "loaded trusted key");
            keys.insert(kid.to_owned(), key);
        }

        tracing::info!(dir = %dir.display(), count = keys.len(), "trusted key store loaded");
        Ok(Self { keys })
    }

    /// Number of loaded keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the directory contained no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl TrustedKeyStore for DirKeyStore {
    fn verifying_key(&self, kid: &str) -> Result<Option<RsaPublicKey>> {
        validate_key_id(kid)?;
        Ok(self.keys.get(kid).cloned())
    }
}

/// Parse a PEM public key, trying SPKI first and PKCS#1 second.
fn parse_public_key_pem(kid: &str, pem: &str) -> Result<RsaPublicKey> {
    if let Ok(key) = RsaPublicKey::from_public_key_pem(pem) {
        return Ok(key);
    }
    RsaPublicKey::from_pkcs1_pem(pem)
        .map_err(|e| KeystoreError::invalid_key(kid, format!("not an RSA public key PEM: {e}")))
}
