//! Key store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or looking up trusted keys.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KeystoreError {
    /// Reading the key directory or a key file failed.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A key file exists but its contents are not a usable RSA public key.
    #[error("invalid key material for key id '{kid}': {detail}")]
    InvalidKey {
        /// Key identifier the material was loaded for.
        kid: String,
        /// What went wrong while parsing.
        detail: String,
    },

    /// A key identifier failed the charset/length checks.
    #[error("invalid key id '{kid}': {reason}")]
    InvalidKeyId {
        /// The offending key identifier.
        kid: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl KeystoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn invalid_key(kid: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidKey { kid: kid.into(), detail: detail.into() }
    }

    pub(crate) fn invalid_key_id(kid: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKeyId { kid: kid.into(), reason: reason.into() }
    }
}

/// Result type alias for key store operations.
pub type Result<T> = std::result::Result<T, KeystoreError>;
