//! Cryptographic verifier.
//!
//! Two independent primitives, both pure functions:
//!
//! - RSA PKCS#1 v1.5 over a SHA-1 digest for response tokens signed by the
//!   login service, against keys from an injected [`TrustedKeyStore`].
//! - HMAC-SHA1 under the locally held session secret for session tickets the
//!   agent issues to itself.
//!
//! SHA-1 is fixed by the deployed wire protocol; the session secret side
//! could use anything, but shares the primitive so one implementation covers
//! both.

use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;
use webauth_keystore::TrustedKeyStore;

use crate::{
    error::{AuthError, Result},
    wire,
};

type HmacSha1 = Hmac<Sha1>;

/// Verify a response token signature.
///
/// Looks up the public key named by `kid` and verifies `sig_text` (WLS
/// base64) as an RSA PKCS#1 v1.5 signature over the SHA-1 digest of
/// `signed_text`.
///
/// # Errors
///
/// - [`AuthError::UnknownKey`] if no trusted key is registered under `kid`
/// - [`AuthError::Malformed`] if the signature text fails to decode
/// - [`AuthError::InvalidTokenSignature`] if verification fails
/// - [`AuthError::Keystore`] if the key id itself is rejected
pub fn verify_wls_signature(
    signed_text: &str,
    sig_text: &str,
    kid: &str,
    keys: &dyn TrustedKeyStore,
) -> Result<()> {
    let key = keys.verifying_key(kid)?.ok_or_else(|| AuthError::unknown_key(kid))?;
    let sig = wire::wls_decode(sig_text)?;
    let digest = Sha1::digest(signed_text.as_bytes());

    key.verify(rsa::Pkcs1v15Sign::new::<Sha1>(), &digest, &sig).map_err(|e| {
        tracing::debug!(kid, error = %e, "response token signature rejected");
        AuthError::InvalidTokenSignature
    })
}

/// Sign session ticket text with the local secret.
///
/// Returns the HMAC-SHA1 tag in the WLS base64 variant, ready to append as
/// the ticket's final field.
#[must_use]
pub fn sign_session(data: &str, secret: &str) -> String {
    wire::wls_encode(&hmac_sha1(data, secret))
}

/// Verify a session ticket signature in constant time.
///
/// Returns `false` for undecodable signature text rather than an error;
/// callers treat any `false` as forgery.
#[must_use]
pub fn verify_session(data: &str, sig_text: &str, secret: &str) -> bool {
    let Ok(presented) = wire::wls_decode(sig_text) else {
        return false;
    };
    let expected = hmac_sha1(data, secret);
    expected.ct_eq(&presented).into()
}

fn hmac_sha1(data: &str, secret: &str) -> Vec<u8> {
    #[allow(clippy::expect_used)]
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .expect("HMAC-SHA1 accepts keys of any length");
    mac.update(data.as_bytes());
    mac.finalize().into_bytes().to_vec()
}
