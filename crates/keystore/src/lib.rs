//! # WebAuth Trusted Key Store
//!
//! Storage for the public keys the agent trusts when verifying response
//! tokens from the Web Login Service (WLS).
//!
//! This crate provides:
//! - **`TrustedKeyStore`**: the lookup trait the verifier depends on
//! - **`DirKeyStore`**: loads PEM public keys from a directory once at startup
//! - **`MemoryKeyStore`**: in-memory store for testing
//!
//! Key material is read-only at request time. `DirKeyStore` reads the key
//! directory exactly once at construction, so authenticating a request never
//! touches the disk.
//!
//! ## Example
//!
//! ```no_run
//! use webauth_keystore::{DirKeyStore, TrustedKeyStore};
//!
//! # fn example() -> Result<(), webauth_keystore::KeystoreError> {
//! let store = DirKeyStore::open("/etc/webauth/keys")?;
//! if let Some(key) = store.verifying_key("2")? {
//!     println!("key 2 has {} bit modulus", rsa::traits::PublicKeyParts::size(&key) * 8);
//! }
//! # Ok(())
//! # }
//! ```

/// Directory-backed key store.
pub mod dir;
/// Key store error types.
pub mod error;
/// Lookup trait and in-memory store.
pub mod store;

pub use dir::DirKeyStore;
pub use error::{KeystoreError, Result};
pub use store::{MAX_KEY_ID_LEN, MemoryKeyStore, TrustedKeyStore, validate_key_id};
