//! Locally issued session tickets.
//!
//! A session ticket is the agent's own signed record of a verified
//! authentication, carried client-side in a cookie: eleven `!`-joined fields
//! (ver, status, msg, issue, expire, id, principal, auth, sso, params, sig),
//! signed with HMAC-SHA1 under the local session secret. The server keeps no
//! copy; the signature is the only thing that makes the cookie trustworthy.

use bon::Builder;
use chrono::{DateTime, Utc};

use crate::{
    crypto,
    error::{AuthError, Result},
    status::Status,
    wire,
};

/// Ticket format version this agent issues and accepts.
pub const TICKET_VERSION: &str = "1";

/// A verified-session value object. Immutable once signed.
#[derive(Clone, Debug, PartialEq, Eq, Builder)]
pub struct SessionTicket {
    /// Ticket format version.
    #[builder(into, default = TICKET_VERSION.to_owned())]
    pub ver: String,
    /// Status recorded at issue time.
    pub status: Status,
    /// Message recorded at issue time (empty when absent).
    #[builder(into, default)]
    pub msg: String,
    /// When the ticket was issued.
    pub issue: DateTime<Utc>,
    /// When the ticket ceases to be valid.
    pub expire: DateTime<Utc>,
    /// Unique id, carried over from the response token.
    #[builder(into, default)]
    pub id: String,
    /// Authenticated principal identifier.
    #[builder(into)]
    pub principal: String,
    /// Authentication type used.
    #[builder(into, default)]
    pub auth: String,
    /// Previous authentication types if satisfied via single sign-on.
    #[builder(into, default)]
    pub sso: String,
    /// Opaque application parameters.
    #[builder(into, default)]
    pub params: String,
}

impl SessionTicket {
    /// The `!`-joined text the HMAC covers: all fields except the signature.
    ///
    /// Timestamps render in the canonical wire format, truncated to whole
    /// seconds, so the signing input is reproducible from a decoded ticket.
    #[must_use]
    pub fn signing_input(&self) -> String {
        let status = self.status.code().to_string();
        wire::join_fields(&[
            &self.ver,
            &status,
            &self.msg,
            &wire::format_timestamp(self.issue),
            &wire::format_timestamp(self.expire),
            &self.id,
            &self.principal,
            &self.auth,
            &self.sso,
            &self.params,
        ])
    }

    /// Serialize and sign, producing the cookie value text.
    #[must_use]
    pub fn encode(&self, secret: &str) -> String {
        let input = self.signing_input();
        let sig = crypto::sign_session(&input, secret);
        format!("{input}!{sig}")
    }

    /// Verify and deserialize a cookie value.
    ///
    /// The HMAC is checked over the received bytes *before* any field is
    /// parsed, so malformed-but-unsigned data is reported as forgery, not as
    /// a parse error an attacker can distinguish.
    ///
    /// # Errors
    ///
    /// - [`AuthError::SessionForged`] if the signature does not verify
    /// - [`AuthError::Malformed`] / [`AuthError::InvalidTimestamp`] if a
    ///   signed field fails strict parsing
    pub fn decode_verified(cookie: &str, secret: &str) -> Result<Self> {
        let Some((input, sig)) = cookie.rsplit_once(wire::FIELD_DELIMITER) else {
            return Err(AuthError::SessionForged);
        };
        if !crypto::verify_session(input, sig, secret) {
            return Err(AuthError::SessionForged);
        }

        let fields: Vec<&str> = input.split(wire::FIELD_DELIMITER).collect();
        if fields.len() != 10 {
            return Err(AuthError::malformed(format!(
                "session ticket has {} fields, expected 10",
                fields.len() + 1
            )));
        }
        let status = Status::from_wire(fields[1])
            .ok_or_else(|| AuthError::malformed(format!("unrecognised status '{}'", fields[1])))?;
        Ok(Self {
            ver: fields[0].to_owned(),
            status,
            msg: fields[2].to_owned(),
            issue: wire::parse_timestamp(fields[3])?,
            expire: wire::parse_timestamp(fields[4])?,
            id: fields[5].to_owned(),
            principal: fields[6].to_owned(),
            auth: fields[7].to_owned(),
            sso: fields[8].to_owned(),
            params: fields[9].to_owned(),
        })
    }

    /// Whether `now` falls inside the validity window `issue <= now < expire`.
    ///
    /// The expiry bound is exclusive: a ticket is already expired at the
    /// exact `expire` instant.
    #[must_use]
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.issue <= now && now < self.expire
    }

    /// Whether this ticket came from a single-sign-on response.
    #[must_use]
    pub fn is_sso(&self) -> bool {
        !self.sso.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    const SECRET: &str = "test-session-secret";

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
    }

    fn sample_ticket() -> SessionTicket {
        SessionTicket::builder()
            .status(Status::Ok)
            .issue(fixed_now())
            .expire(fixed_now() + Duration::seconds(7200))
            .id("resp-0001")
            .principal("abc123")
            .auth("pwd")
            .build()
    }

    #[test]
    fn test_builder_defaults() {
        let ticket = sample_ticket();
        assert_eq!(ticket.ver, TICKET_VERSION);
        assert_eq!(ticket.msg, "");
        assert_eq!(ticket.sso, "");
        assert_eq!(ticket.params, "");
    }

    #[test]
    fn test_signing_input_layout() {
        let ticket = sample_ticket();
        assert_eq!(
            ticket.signing_input(),
            "1!200!!20240115T103000Z!20240115T123000Z!resp-0001!abc123!pwd!!"
        );
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let ticket = sample_ticket();
        let cookie = ticket.encode(SECRET);
        let decoded = SessionTicket::decode_verified(&cookie, SECRET).unwrap();
        assert_eq!(decoded, ticket);
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let cookie = sample_ticket().encode(SECRET);
        let result = SessionTicket::decode_verified(&cookie, "other-secret");
        assert!(matches!(result, Err(AuthError::SessionForged)));
    }

    #[test]
    fn test_decode_rejects_flipped_characters_anywhere() {
        let cookie = sample_ticket().encode(SECRET);
        for i in 0..cookie.len() {
            let mut bytes = cookie.clone().into_bytes();
            bytes[i] = if bytes[i] == b'x' { b'y' } else { b'x' };
            let Ok(tampered) = String::from_utf8(bytes) else {
                continue;
            };
            if tampered == cookie {
                continue;
            }
            assert!(
                SessionTicket::decode_verified(&tampered, SECRET).is_err(),
                "tampering at byte {i} was not detected"
            );
        }
    }

    #[test]
    fn test_decode_rejects_signature_swap() {
        let a = sample_ticket().encode(SECRET);
        let mut other = sample_ticket();
        other.principal = "mallory".into();
        let b = other.encode(SECRET);

        let (a_input, _) = a.rsplit_once('!').unwrap();
        let (_, b_sig) = b.rsplit_once('!').unwrap();
        let spliced = format!("{a_input}!{b_sig}");
        // Same layout, but the signature belongs to different field values.
        assert!(SessionTicket::decode_verified(&spliced, SECRET).is_err());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(SessionTicket::decode_verified("", SECRET).is_err());
        assert!(SessionTicket::decode_verified("no-delimiters-at-all", SECRET).is_err());
        assert!(SessionTicket::decode_verified("a!b", SECRET).is_err());
    }

    #[test]
    fn test_validity_window_is_half_open() {
        let ticket = sample_ticket();
        assert!(ticket.is_current(ticket.issue));
        assert!(ticket.is_current(ticket.expire - Duration::seconds(1)));
        // Exclusive at expiry: a ticket with expire == now is expired.
        assert!(!ticket.is_current(ticket.expire));
        assert!(!ticket.is_current(ticket.issue - Duration::seconds(1)));
    }

    #[test]
    fn test_decode_preserves_optional_fields() {
        let ticket = SessionTicket::builder()
            .status(Status::Ok)
            .msg("carried message")
            .issue(fixed_now())
            .expire(fixed_now() + Duration::seconds(60))
            .principal("abc123")
            .sso("pwd")
            .params("return=/deep/link")
            .build();
        let decoded = SessionTicket::decode_verified(&ticket.encode(SECRET), SECRET).unwrap();
        assert_eq!(decoded.msg, "carried message");
        assert!(decoded.is_sso());
        assert_eq!(decoded.params, "return=/deep/link");
    }
}
