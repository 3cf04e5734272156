//! Test helpers: a stand-in login service that mints signed response tokens.
//!
//! Only compiled for tests or under the `testutil` feature. Key generation
//! uses small RSA keys to keep test startup fast; nothing here is suitable
//! for production use.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use bon::Builder;
use chrono::{DateTime, Utc};
use rsa::{
    Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey,
    pkcs8::{EncodePublicKey, LineEnding},
};
use sha1::{Digest, Sha1};
use webauth_keystore::MemoryKeyStore;

use crate::wire;

/// Assert that a `Result` is `Err` matching the given [`AuthError`] pattern.
///
/// [`AuthError`]: crate::AuthError
#[macro_export]
macro_rules! assert_auth_error {
    ($result:expr, $pattern:pat $(,)?) => {
        match $result {
            Err($pattern) => {}
            Err(other) => panic!("expected {}, got {other:?}", stringify!($pattern)),
            Ok(_) => panic!("expected {}, got Ok", stringify!($pattern)),
        }
    };
}

/// A fake login service holding one RSA keypair.
pub struct TestWls {
    /// Key id the service signs under.
    pub kid: String,
    private: RsaPrivateKey,
}

impl TestWls {
    /// Generate a fresh service with the given key id.
    #[must_use]
    pub fn new(kid: &str) -> Self {
        let mut rng = rand_core::OsRng;
        let private = RsaPrivateKey::new(&mut rng, 1024).expect("generate test RSA key");
        Self { kid: kid.to_owned(), private }
    }

    /// The service's public verification key.
    #[must_use]
    pub fn public_key(&self) -> RsaPublicKey {
        self.private.to_public_key()
    }

    /// The public key in SPKI PEM form, for writing `<kid>.pem` key files.
    #[must_use]
    pub fn public_key_pem(&self) -> String {
        self.public_key().to_public_key_pem(LineEnding::LF).expect("encode public key PEM")
    }

    /// A key store already holding this service's public key.
    #[must_use]
    pub fn keystore(&self) -> MemoryKeyStore {
        let store = MemoryKeyStore::new();
        store.insert_key(&self.kid, self.public_key()).expect("insert test key");
        store
    }

    /// Sign arbitrary text the way the service signs token fields.
    #[must_use]
    pub fn sign(&self, signed_text: &str) -> String {
        let digest = Sha1::digest(signed_text.as_bytes());
        let sig = self.private.sign(Pkcs1v15Sign::new::<Sha1>(), &digest).expect("sign");
        wire::wls_encode(&sig)
    }

    /// Render a complete, signed response token in wire form.
    #[must_use]
    pub fn token(&self, fields: &TokenFields) -> String {
        let signed = fields.signed_text();
        format!("{signed}!{}!{}", self.kid, self.sign(&signed))
    }
}

/// Field values for a minted response token, with plausible defaults.
#[derive(Clone, Debug, Builder)]
pub struct TokenFields {
    #[builder(into, default = "1".to_owned())]
    pub ver: String,
    #[builder(into, default = "200".to_owned())]
    pub status: String,
    #[builder(into, default)]
    pub msg: String,
    /// Issue instant, rendered in wire format.
    pub issue: DateTime<Utc>,
    #[builder(into, default = "resp-0001".to_owned())]
    pub id: String,
    #[builder(into)]
    pub url: String,
    #[builder(into, default = "abc123".to_owned())]
    pub principal: String,
    #[builder(into, default = "pwd".to_owned())]
    pub auth: String,
    #[builder(into, default)]
    pub sso: String,
    #[builder(into, default = "3600".to_owned())]
    pub life: String,
    #[builder(into, default)]
    pub params: String,
}

impl TokenFields {
    /// The eleven signed fields, `!`-joined.
    #[must_use]
    pub fn signed_text(&self) -> String {
        wire::join_fields(&[
            &self.ver,
            &self.status,
            &self.msg,
            &wire::format_timestamp(self.issue),
            &self.id,
            &self.url,
            &self.principal,
            &self.auth,
            &self.sso,
            &self.life,
            &self.params,
        ])
    }
}

/// Render a callback URL: `base` plus the percent-encoded token parameter.
#[must_use]
pub fn callback_url(base: &str, token: &str) -> String {
    format!("{base}?WLS-Response={}", wire::percent_encode(token))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{crypto, token::ResponseToken};

    #[test]
    fn test_minted_token_parses_and_verifies() {
        let wls = TestWls::new("901");
        let fields = TokenFields::builder()
            .issue(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap())
            .url("https://app.example.org/")
            .build();
        let text = wls.token(&fields);

        let token = ResponseToken::parse(&text).unwrap();
        assert_eq!(token.principal, "abc123");
        assert_eq!(token.kid, "901");
        let store = wls.keystore();
        crypto::verify_wls_signature(&token.signed_text(), &token.sig, "901", &store).unwrap();
    }

    #[test]
    fn test_tampered_token_fails_verification() {
        let wls = TestWls::new("901");
        let fields = TokenFields::builder()
            .issue(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap())
            .url("https://app.example.org/")
            .build();
        let text = wls.token(&fields).replace("abc123", "mallory");

        let token = ResponseToken::parse(&text).unwrap();
        let store = wls.keystore();
        let result = crypto::verify_wls_signature(&token.signed_text(), &token.sig, "901", &store);
        assert_auth_error!(result, crate::AuthError::InvalidTokenSignature);
    }

    #[test]
    fn test_public_key_pem_round_trips_through_parsing() {
        use rsa::pkcs8::DecodePublicKey;

        let wls = TestWls::new("2");
        let parsed = RsaPublicKey::from_public_key_pem(&wls.public_key_pem()).unwrap();
        assert_eq!(parsed, wls.public_key());
    }
}
