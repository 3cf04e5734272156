//! Response tokens issued by the Web Login Service.
//!
//! A response token is the `WLS-Response` query parameter: thirteen
//! `!`-joined fields. The raw field text is retained verbatim so the signed
//! byte sequence can be re-derived exactly; typed accessors convert at the
//! boundary.
//!
//! Field order: ver, status, msg, issue, id, url, principal, auth, sso,
//! life, params, kid, sig. The signature covers the first eleven fields.

use chrono::{DateTime, Utc};

use crate::{
    error::{AuthError, Result},
    status::Status,
    wire,
};

/// Number of `!`-separated fields in a response token.
pub const RESPONSE_TOKEN_FIELDS: usize = 13;

/// A parsed, not-yet-verified response token.
///
/// Invariant: nothing beyond `ver`, `status`, `kid`, and `sig` may be acted
/// on until the signature has verified under the trusted key named by `kid`.
/// The engine enforces this ordering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseToken {
    /// Protocol version the service replied with.
    pub ver: String,
    /// Status code, as wire text.
    pub status: String,
    /// Optional status message (empty when absent).
    pub msg: String,
    /// Issue timestamp, as wire text.
    pub issue: String,
    /// Unique response identifier.
    pub id: String,
    /// The URL this token was issued for.
    pub url: String,
    /// Authenticated principal identifier.
    pub principal: String,
    /// Authentication type used, if authentication was interactive.
    pub auth: String,
    /// Previously used authentication types, if satisfied from an existing
    /// login-service session (non-empty means single sign-on).
    pub sso: String,
    /// Session lifetime in seconds granted by the service (empty when absent).
    pub life: String,
    /// Opaque application parameters, returned unchanged.
    pub params: String,
    /// Identifier of the key that signed this token.
    pub kid: String,
    /// Signature over the first eleven fields, in the WLS base64 variant.
    pub sig: String,
}

impl ResponseToken {
    /// Parse a percent-decoded `WLS-Response` value.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Malformed`] unless exactly
    /// [`RESPONSE_TOKEN_FIELDS`] fields are present.
    pub fn parse(decoded: &str) -> Result<Self> {
        let fields: Vec<&str> = decoded.split(wire::FIELD_DELIMITER).collect();
        if fields.len() != RESPONSE_TOKEN_FIELDS {
            return Err(AuthError::malformed(format!(
                "response token has {} fields, expected {RESPONSE_TOKEN_FIELDS}",
                fields.len()
            )));
        }
        Ok(Self {
            ver: fields[0].to_owned(),
            status: fields[1].to_owned(),
            msg: fields[2].to_owned(),
            issue: fields[3].to_owned(),
            id: fields[4].to_owned(),
            url: fields[5].to_owned(),
            principal: fields[6].to_owned(),
            auth: fields[7].to_owned(),
            sso: fields[8].to_owned(),
            life: fields[9].to_owned(),
            params: fields[10].to_owned(),
            kid: fields[11].to_owned(),
            sig: fields[12].to_owned(),
        })
    }

    /// The exact byte sequence the service signed: the `!`-join of the first
    /// eleven fields, excluding `kid` and `sig`.
    #[must_use]
    pub fn signed_text(&self) -> String {
        wire::join_fields(&[
            &self.ver,
            &self.status,
            &self.msg,
            &self.issue,
            &self.id,
            &self.url,
            &self.principal,
            &self.auth,
            &self.sso,
            &self.life,
            &self.params,
        ])
    }

    /// Parsed status code, if recognised.
    #[must_use]
    pub fn status(&self) -> Option<Status> {
        Status::from_wire(&self.status)
    }

    /// Strictly parsed issue time.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidTimestamp`] for malformed timestamps.
    pub fn issue_time(&self) -> Result<DateTime<Utc>> {
        wire::parse_timestamp(&self.issue)
    }

    /// Granted session lifetime in seconds, if present and positive.
    #[must_use]
    pub fn life_seconds(&self) -> Option<u64> {
        self.life.parse::<u64>().ok().filter(|&life| life > 0)
    }

    /// Whether this result came from an existing login-service session
    /// rather than fresh interaction.
    #[must_use]
    pub fn is_sso(&self) -> bool {
        !self.sso.is_empty()
    }
}
