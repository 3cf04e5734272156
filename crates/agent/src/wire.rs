//! Wire-format primitives shared by response tokens and session tickets.
//!
//! The WLS protocol is a text protocol: `!`-joined ordered fields, percent
//! encoding for URL embedding, a base64 variant for binary signatures, and a
//! fixed UTC timestamp format. Everything here must round-trip byte-for-byte,
//! because signatures are computed over the exact joined text.

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, NaiveDateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::error::{AuthError, Result};

/// Field delimiter for both response tokens and session tickets.
pub const FIELD_DELIMITER: char = '!';

/// Canonical timestamp format, e.g. `20240115T103000Z`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Percent-encoding set equivalent to RFC 3986 `rawurlencode`: everything but
/// unreserved characters (`A-Z a-z 0-9 - _ . ~`) is escaped.
const RAW_URL: &AsciiSet =
    &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Encode bytes with the WLS base64 variant.
///
/// Standard base64 with the URL-hostile characters substituted:
/// `+` becomes `-`, `/` becomes `.`, `=` becomes `_`.
#[must_use]
pub fn wls_encode(data: &[u8]) -> String {
    STANDARD
        .encode(data)
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '.',
            '=' => '_',
            other => other,
        })
        .collect()
}

/// Decode text produced by [`wls_encode`].
///
/// # Errors
///
/// Returns [`AuthError::Malformed`] for characters outside the substituted
/// base64 alphabet or bad padding. Decoding failures are verification
/// failures, never panics.
pub fn wls_decode(text: &str) -> Result<Vec<u8>> {
    let translated: String = text
        .chars()
        .map(|c| match c {
            '-' => '+',
            '.' => '/',
            '_' => '=',
            other => other,
        })
        .collect();
    STANDARD
        .decode(translated)
        .map_err(|e| AuthError::malformed(format!("bad signature encoding: {e}")))
}

/// Render a timestamp in the canonical UTC wire format.
#[must_use]
pub fn format_timestamp(t: DateTime<Utc>) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a canonical wire timestamp.
///
/// Parsing is strict: anything that is not exactly `YYYYMMDD'T'HHMMSS'Z'` is
/// rejected as a verification failure.
///
/// # Errors
///
/// Returns [`AuthError::InvalidTimestamp`] on any deviation from the format.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| AuthError::invalid_timestamp(text))
}

/// Percent-encode with the `rawurlencode` character set.
#[must_use]
pub fn percent_encode(text: &str) -> String {
    utf8_percent_encode(text, RAW_URL).to_string()
}

/// Percent-decode, requiring the result to be valid UTF-8.
///
/// # Errors
///
/// Returns [`AuthError::Malformed`] if the decoded bytes are not UTF-8.
pub fn percent_decode(text: &str) -> Result<String> {
    percent_decode_str(text)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| AuthError::malformed("percent-encoded data is not valid UTF-8"))
}

/// Join fields with the wire delimiter. Absent optionals must already be
/// rendered as empty strings by the caller.
#[must_use]
pub fn join_fields(fields: &[&str]) -> String {
    fields.join("!")
}
